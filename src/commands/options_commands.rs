use std::io::ErrorKind;

use log::warn;
use serde::Serialize;

use crate::config::AppConfig;
use crate::errors::AppResult;
use crate::models::{DisplayOptions, EXAMPLE_CATEGORIES, ExampleCategory, Language, Level};

pub const APP_IMAGE_NOTICE: &str = "Please add AppImage.png to your project directory";

#[derive(Debug, Clone, Serialize)]
pub struct LanguageOption {
    pub value: Language,
    pub label: &'static str,
    pub locale: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct LevelOption {
    pub value: Level,
    pub label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppImageStatus {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<&'static str>,
}

/// Everything the sidebar needs to render its selectors
#[derive(Debug, Clone, Serialize)]
pub struct Options {
    pub languages: Vec<LanguageOption>,
    pub levels: Vec<LevelOption>,
    pub display: DisplayOptions,
    pub examples: &'static [ExampleCategory],
    pub app_image: AppImageStatus,
}

pub async fn get_options(config: &AppConfig) -> Options {
    let available = tokio::fs::try_exists(config.app_image_path())
        .await
        .unwrap_or(false);

    Options {
        languages: Language::ALL
            .iter()
            .map(|language| LanguageOption {
                value: *language,
                label: language.label(),
                locale: language.locale(),
            })
            .collect(),
        levels: Level::ALL
            .iter()
            .map(|level| LevelOption {
                value: *level,
                label: level.label(),
            })
            .collect(),
        display: DisplayOptions::default(),
        examples: EXAMPLE_CATEGORIES,
        app_image: AppImageStatus {
            available,
            notice: (!available).then_some(APP_IMAGE_NOTICE),
        },
    }
}

/// Reads the decorative image. A missing file is not an error, the page shows a notice instead.
pub async fn load_app_image(config: &AppConfig) -> AppResult<Option<Vec<u8>>> {
    let path = config.app_image_path();
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("{} ({} not found)", APP_IMAGE_NOTICE, path.display());
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
