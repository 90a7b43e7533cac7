//! Text strips exported as SubRip (`.srt`) subtitles.

use crate::foundation::core::{Fps, Frame, FrameSpan};
use crate::foundation::error::{StriplineError, StriplineResult};
use crate::strip::model::{EffectKind, StripId, StripKind};
use crate::strip::timeline::{ListRef, Timeline};
use anyhow::Context as _;
use std::io::Write;
use std::path::{Path, PathBuf};

/// One caption: a text strip's display range and its text.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Cue {
    pub strip: StripId,
    pub span: FrameSpan,
    pub text: String,
}

/// Text strips anywhere in the timeline, ordered by display start.
///
/// Strips starting on the same frame keep their pre-order position.
pub fn collect_cues(tl: &Timeline) -> Vec<Cue> {
    let mut cues: Vec<Cue> = tl
        .iter_recursive(ListRef::Root)
        .into_iter()
        .map(|id| &tl[id])
        .filter(|s| s.kind == StripKind::Effect(EffectKind::Text))
        .map(|s| Cue {
            strip: s.id,
            span: s.disp_span(),
            text: s.content.text.clone().unwrap_or_default(),
        })
        .collect();
    cues.sort_by_key(|c| c.span.start);
    cues
}

/// `HH:MM:SS,mmm` wall-clock position of `frame`.
pub fn subrip_timecode(frame: Frame, fps: Fps) -> String {
    let ms = fps.frame_to_millis(frame);
    let sign = if ms < 0 { "-" } else { "" };
    let ms = ms.unsigned_abs();
    format!(
        "{sign}{:02}:{:02}:{:02},{:03}",
        ms / 3_600_000,
        ms / 60_000 % 60,
        ms / 1000 % 60,
        ms % 1000
    )
}

/// Write every text strip of `tl` as a numbered cue. Returns the number of cues.
#[tracing::instrument(skip(tl, w))]
pub fn write_subrip<W: Write>(tl: &Timeline, mut w: W) -> StriplineResult<usize> {
    let cues = collect_cues(tl);
    if cues.is_empty() {
        return Err(StriplineError::precondition(
            "No subtitles (text strips) to export",
        ));
    }
    for (i, cue) in cues.iter().enumerate() {
        write!(
            w,
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            subrip_timecode(cue.span.start, tl.fps),
            subrip_timecode(cue.span.end, tl.fps),
            cue.text
        )
        .context("write subtitle cue")?;
    }
    w.flush().context("flush subtitles")?;
    tracing::debug!(cues = cues.len(), "exported subtitles");
    Ok(cues.len())
}

/// `path` with `.srt` appended unless it already ends in it.
pub fn srt_path(path: &Path) -> PathBuf {
    let is_srt = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("srt"));
    if is_srt {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".srt");
        PathBuf::from(name)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/edit/subtitles.rs"]
mod tests;
