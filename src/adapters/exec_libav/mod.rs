//! FFmpeg engine adapter using libav bindings
//!
//! Implements the media engine port on top of `ffmpeg-next`. The workspace is a
//! directory that receives produced outputs; ingested inputs are registered by
//! name and read in place, so large sources are never copied.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ffmpeg_next as ffmpeg;
use parking_lot::Mutex;
use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::domain::model::*;
use crate::error::{SplitXError, SplitXResult};
use crate::ports::*;

/// FFmpeg stream-copy engine with an on-disk workspace
pub struct LibavEngineAdapter {
    workspace: PathBuf,
    // Keeps a temporary workspace alive for the adapter's lifetime.
    _temp_dir: Option<TempDir>,
    inputs: Mutex<HashMap<String, PathBuf>>,
}

impl LibavEngineAdapter {
    /// Create an engine with a fresh temporary workspace
    pub fn new() -> SplitXResult<Self> {
        crate::init()?;
        let temp_dir = tempfile::Builder::new().prefix("splitx-").tempdir()?;
        let workspace = temp_dir.path().to_path_buf();
        debug!(workspace = %workspace.display(), "Created temporary engine workspace");
        Ok(Self {
            workspace,
            _temp_dir: Some(temp_dir),
            inputs: Mutex::new(HashMap::new()),
        })
    }

    /// Create an engine using an existing directory as its workspace
    pub fn with_workspace(dir: impl AsRef<Path>) -> SplitXResult<Self> {
        crate::init()?;
        let workspace = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&workspace)?;
        Ok(Self {
            workspace,
            _temp_dir: None,
            inputs: Mutex::new(HashMap::new()),
        })
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Map a bare workspace name to its path
    fn output_path(&self, name: &str) -> SplitXResult<PathBuf> {
        let candidate = Path::new(name);
        match candidate.file_name() {
            Some(file) if file == candidate.as_os_str() => Ok(self.workspace.join(file)),
            _ => Err(SplitXError::WorkspaceEntryMissing {
                name: name.to_string(),
            }),
        }
    }

    fn input_path(&self, name: &str) -> SplitXResult<PathBuf> {
        self.inputs
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| SplitXError::WorkspaceEntryMissing {
                name: name.to_string(),
            })
    }

    fn missing_as_workspace_error(name: &str, error: std::io::Error) -> SplitXError {
        if error.kind() == std::io::ErrorKind::NotFound {
            SplitXError::WorkspaceEntryMissing {
                name: name.to_string(),
            }
        } else {
            SplitXError::IoError(error)
        }
    }
}

/// Read the container duration in seconds
fn probe_container_duration(path: &Path) -> SplitXResult<f64> {
    let ictx = ffmpeg::format::input(&path).map_err(|e| SplitXError::ProbeError {
        message: format!("Failed to open {}: {}", path.display(), e),
    })?;
    let duration = ictx.duration();
    if duration <= 0 {
        return Err(SplitXError::ProbeError {
            message: format!("{} has no usable duration", path.display()),
        });
    }
    Ok(duration as f64 / ffmpeg::ffi::AV_TIME_BASE as f64)
}

/// Container start time in seconds, 0 when the demuxer does not report one
///
/// MPEG-TS inputs typically start around 1.4s; segment times are relative to it.
fn container_start_seconds(ictx: &ffmpeg::format::context::Input) -> f64 {
    // SAFETY: the context pointer stays valid while `ictx` is borrowed.
    let start_time = unsafe { (*ictx.as_ptr()).start_time };
    if start_time == i64::MIN {
        // AV_NOPTS_VALUE
        0.0
    } else {
        start_time as f64 / ffmpeg::ffi::AV_TIME_BASE as f64
    }
}

/// Zero out the codec tag so the output muxer picks one valid for its container
fn reset_codec_tag(out_stream: &mut ffmpeg::format::stream::StreamMut) {
    // SAFETY: the stream pointer is valid for the lifetime of `out_stream` and
    // `codecpar` was populated by `set_parameters`.
    unsafe {
        (*(*out_stream.as_mut_ptr()).codecpar).codec_tag = 0;
    }
}

/// Lossless cut: seek to the keyframe at or before `from`, copy packets until `to`
fn stream_copy(input: &Path, output: &Path, from: f64, to: f64) -> SplitXResult<()> {
    let mut ictx = ffmpeg::format::input(&input)?;
    let mut octx = ffmpeg::format::output(&output)?;

    let stream_count = ictx.nb_streams() as usize;
    let mut stream_mapping: Vec<Option<usize>> = vec![None; stream_count];
    let mut next_index = 0;
    for (ist_index, ist) in ictx.streams().enumerate() {
        let medium = ist.parameters().medium();
        if medium != ffmpeg::media::Type::Video
            && medium != ffmpeg::media::Type::Audio
            && medium != ffmpeg::media::Type::Subtitle
        {
            continue;
        }
        let mut ost = octx.add_stream(ffmpeg::encoder::find(ffmpeg::codec::Id::None))?;
        ost.set_parameters(ist.parameters());
        reset_codec_tag(&mut ost);
        stream_mapping[ist_index] = Some(next_index);
        next_index += 1;
    }

    if next_index == 0 {
        return Err(SplitXError::ClippingError {
            message: format!("{} has no audio, video or subtitle streams", input.display()),
        });
    }

    octx.set_metadata(ictx.metadata().to_owned());
    let mut opts = ffmpeg::Dictionary::new();
    // Packets before `from` (back to the keyframe) get negative timestamps.
    opts.set("avoid_negative_ts", "make_zero");
    octx.write_header_with(opts)?;

    let out_time_bases: Vec<ffmpeg::Rational> = octx.streams().map(|s| s.time_base()).collect();

    let start = container_start_seconds(&ictx);
    let (from_abs, to_abs) = (from + start, to + start);
    if from > 0.0 {
        let seek_ts = (from_abs * ffmpeg::ffi::AV_TIME_BASE as f64) as i64;
        ictx.seek(seek_ts, ..seek_ts)?;
    }

    let mut finished = vec![false; stream_count];
    let mut remaining = next_index;
    let mut written: u64 = 0;

    for (stream, mut packet) in ictx.packets() {
        let ist_index = stream.index();
        let Some(ost_index) = stream_mapping.get(ist_index).copied().flatten() else {
            continue;
        };
        if finished[ist_index] {
            continue;
        }

        let in_time_base = stream.time_base();
        let seconds_per_tick = f64::from(in_time_base);
        // Decode order: B-frames shown before an anchor past `to` still follow it.
        if let Some(ts) = packet.dts().or(packet.pts()) {
            if ts as f64 * seconds_per_tick >= to_abs {
                finished[ist_index] = true;
                remaining -= 1;
                if remaining == 0 {
                    break;
                }
                continue;
            }
        }

        let offset = (from_abs / seconds_per_tick) as i64;
        packet.set_pts(packet.pts().map(|pts| pts - offset));
        packet.set_dts(packet.dts().map(|dts| dts - offset));
        packet.rescale_ts(in_time_base, out_time_bases[ost_index]);
        packet.set_position(-1);
        packet.set_stream(ost_index);
        packet.write_interleaved(&mut octx)?;
        written += 1;
    }

    if written == 0 {
        return Err(SplitXError::ClippingError {
            message: format!("No packets between {:.3}s and {:.3}s", from, to),
        });
    }

    octx.write_trailer()?;
    debug!(packets = written, start, "Stream copy finished");
    Ok(())
}

#[async_trait]
impl MediaEnginePort for LibavEngineAdapter {
    async fn write_input(&self, name: &str, source: &Path) -> SplitXResult<()> {
        let metadata = tokio::fs::metadata(source)
            .await
            .map_err(|_| SplitXError::InputFileNotFound {
                path: source.display().to_string(),
            })?;
        if !metadata.is_file() {
            return Err(SplitXError::InputFileNotFound {
                path: source.display().to_string(),
            });
        }

        self.inputs
            .lock()
            .insert(name.to_string(), source.to_path_buf());
        debug!(name, source = %source.display(), size = metadata.len(), "Registered input");
        Ok(())
    }

    async fn probe_duration(&self, name: &str) -> SplitXResult<f64> {
        let path = self.input_path(name)?;
        let duration = tokio::task::spawn_blocking(move || probe_container_duration(&path))
            .await
            .map_err(|e| SplitXError::TaskError {
                message: e.to_string(),
            })??;
        debug!(name, duration, "Probed duration");
        Ok(duration)
    }

    async fn cut(&self, request: &CutRequest) -> SplitXResult<()> {
        let input = self.input_path(&request.input_name)?;
        let output = self.output_path(&request.output_name)?;
        let (from, to) = (request.from_seconds, request.to_seconds);
        if !(from < to) {
            return Err(SplitXError::ClippingError {
                message: format!("Empty range {:.3}s - {:.3}s", from, to),
            });
        }

        info!(
            input = %request.input_name,
            output = %request.output_name,
            from,
            to,
            "Cutting with stream copy"
        );

        let target = output.clone();
        let result = tokio::task::spawn_blocking(move || stream_copy(&input, &target, from, to))
            .await
            .map_err(|e| SplitXError::TaskError {
                message: e.to_string(),
            })
            .and_then(|inner| inner);

        if let Err(e) = &result {
            if output.exists() {
                if let Err(remove_err) = tokio::fs::remove_file(&output).await {
                    warn!(output = %output.display(), error = %remove_err, "Failed to remove partial output");
                }
            }
            warn!(output = %request.output_name, error = %e, "Stream copy failed");
        }
        result
    }

    async fn read_output(&self, name: &str) -> SplitXResult<Vec<u8>> {
        let path = self.output_path(name)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| Self::missing_as_workspace_error(name, e))
    }

    async fn remove_output(&self, name: &str) -> SplitXResult<()> {
        let path = self.output_path(name)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| Self::missing_as_workspace_error(name, e))?;
        debug!(name, "Removed output");
        Ok(())
    }

    async fn remove_input(&self, name: &str) -> SplitXResult<()> {
        match self.inputs.lock().remove(name) {
            Some(_) => Ok(()),
            None => Err(SplitXError::WorkspaceEntryMissing {
                name: name.to_string(),
            }),
        }
    }
}
