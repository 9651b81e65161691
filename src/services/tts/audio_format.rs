//! # Audio Format Handling
//!
//! Перекодирование синтезированной речи в формат, который надежно
//! проигрывается браузером: моно, фиксированная частота, 16-бит PCM WAV.
//!
//! ## Этапы
//!
//! - Декодирование MP3/WAV через Symphonia со сведением каналов в моно
//! - Ресемплинг через Rubato
//! - Кодирование в WAV через hound

use std::io::Cursor;
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use log::{debug, info, warn};
use rubato::{Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::errors::{AppError, AppResult};

/// Размер блока для ресемплера
const RESAMPLE_CHUNK: usize = 1024;

/// Вычисляет длительность аудио в секундах
pub fn duration_in_seconds(sample_count: usize, sample_rate: u32) -> f32 {
    sample_count as f32 / sample_rate as f32
}

/// Декодирует аудиофайл в моно PCM семплы.
///
/// Формат определяется по расширению файла (подсказка для Symphonia)
/// и по содержимому.
pub fn decode_audio_file<P: AsRef<Path>>(file_path: P) -> AppResult<(Vec<f32>, u32)> {
    let file_path = file_path.as_ref();
    let extension = file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();

    let buffer = std::fs::read(file_path)?;
    decode_audio_bytes(buffer, Some(&extension))
}

/// Декодирует закодированные данные (MP3, WAV) в моно PCM семплы.
///
/// # Возвращает
///
/// Кортеж из семплов (f32) и частоты дискретизации (u32)
pub fn decode_audio_bytes(data: Vec<u8>, extension: Option<&str>) -> AppResult<(Vec<f32>, u32)> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(data)), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension.filter(|ext| !ext.is_empty()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| AppError::AudioProcessingError(format!("Не удалось определить формат аудио: {}", e)))?;

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AppError::AudioProcessingError("Не найден аудио-трек".to_string()))?;

    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AppError::AudioProcessingError(format!("Не удалось создать декодер: {}", e)))?;

    let mut pcm_data = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                return Err(AppError::AudioProcessingError(format!(
                    "Ошибка чтения пакета: {}",
                    e
                )));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let channels = spec.channels.count();
                if channels == 0 {
                    continue;
                }
                sample_rate.get_or_insert(spec.rate);

                let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                sample_buf.copy_interleaved_ref(decoded);

                // Сводим каналы в моно
                for frame in sample_buf.samples().chunks(channels) {
                    pcm_data.push(frame.iter().sum::<f32>() / channels as f32);
                }
            }
            Err(SymphoniaError::DecodeError(e)) => {
                // Пропускаем проблемный пакет
                warn!("Ошибка декодирования пакета: {}", e);
            }
            Err(e) => {
                return Err(AppError::AudioProcessingError(format!(
                    "Ошибка декодирования: {}",
                    e
                )));
            }
        }
    }

    let sample_rate = sample_rate
        .ok_or_else(|| AppError::AudioProcessingError("Неизвестная частота дискретизации".to_string()))?;

    if pcm_data.is_empty() {
        return Err(AppError::AudioProcessingError("Аудио не содержит семплов".to_string()));
    }

    debug!("Декодировано {} семплов с частотой {}", pcm_data.len(), sample_rate);
    Ok((pcm_data, sample_rate))
}

/// Меняет частоту дискретизации моно сигнала.
pub fn resample(input: &[f32], from_rate: u32, to_rate: u32) -> AppResult<Vec<f32>> {
    if from_rate == 0 || to_rate == 0 {
        return Err(AppError::AudioProcessingError(format!(
            "Некорректная частота: {} -> {}",
            from_rate, to_rate
        )));
    }
    if from_rate == to_rate || input.is_empty() {
        return Ok(input.to_vec());
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, RESAMPLE_CHUNK, 1)
        .map_err(|e| AppError::AudioProcessingError(format!("Ошибка инициализации Rubato: {}", e)))?;

    let expected_len = (input.len() as f64 * ratio).round() as usize;
    let delay = resampler.output_delay();
    let mut output = Vec::with_capacity(expected_len + delay + RESAMPLE_CHUNK);

    // Последний блок дополняется тишиной, еще один пустой блок выталкивает задержку фильтра
    let flush = [0.0f32; RESAMPLE_CHUNK];
    for chunk in input.chunks(RESAMPLE_CHUNK).chain(std::iter::once(&flush[..])) {
        let mut block = chunk.to_vec();
        block.resize(RESAMPLE_CHUNK, 0.0);

        let waves_in = vec![block];
        let frames = resampler
            .process(&waves_in, None)
            .map_err(|e| AppError::AudioProcessingError(format!("Ошибка ресемплинга: {}", e)))?;
        output.extend_from_slice(&frames[0]);
    }

    // Первые `delay` кадров сдвинуты фильтром и не соответствуют началу сигнала
    output.drain(..delay.min(output.len()));
    output.resize(expected_len, 0.0);
    Ok(output)
}

/// Кодирует моно семплы в 16-бит PCM WAV в памяти.
pub fn encode_wav_pcm16(samples: &[f32], sample_rate: u32) -> AppResult<Vec<u8>> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(44 + samples.len() * 2));
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer.write_sample(value)?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

/// Полный путь перекодирования: семплы -> ресемплинг -> WAV.
pub fn to_playback_wav(samples: &[f32], source_rate: u32, target_rate: u32) -> AppResult<Vec<u8>> {
    let resampled = resample(samples, source_rate, target_rate)?;
    let wav = encode_wav_pcm16(&resampled, target_rate)?;
    info!(
        "Перекодировано {:.2}s аудио: {} Гц -> {} Гц, {} байт",
        duration_in_seconds(samples.len(), source_rate),
        source_rate,
        target_rate,
        wav.len()
    );
    Ok(wav)
}
