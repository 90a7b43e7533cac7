use crate::foundation::core::{Channel, Frame, FrameSpan};

/// Stable handle to a strip stored in a [`crate::Timeline`] arena.
///
/// Handles are never reused within a timeline, so a handle to a deleted strip simply stops
/// resolving.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct StripId(pub u32);

impl std::fmt::Display for StripId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Effect kinds and the number of input strips each consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Cross,
    Add,
    Subtract,
    AlphaOver,
    AlphaUnder,
    GammaCross,
    Multiply,
    OverDrop,
    Wipe,
    Glow,
    Transform,
    Color,
    Speed,
    Multicam,
    Adjustment,
    GaussianBlur,
    Text,
    ColorMix,
}

impl EffectKind {
    pub fn input_count(self) -> usize {
        match self {
            Self::Color | Self::Text | Self::Adjustment | Self::Multicam => 0,
            Self::Glow | Self::Transform | Self::Speed | Self::GaussianBlur => 1,
            Self::Cross
            | Self::Add
            | Self::Subtract
            | Self::AlphaOver
            | Self::AlphaUnder
            | Self::GammaCross
            | Self::Multiply
            | Self::OverDrop
            | Self::Wipe
            | Self::ColorMix => 2,
        }
    }
}

/// What a strip plays back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StripKind {
    Movie,
    Image,
    Sound,
    Scene,
    Meta,
    Effect(EffectKind),
}

impl StripKind {
    pub fn is_effect(self) -> bool {
        matches!(self, Self::Effect(_))
    }

    pub fn is_meta(self) -> bool {
        matches!(self, Self::Meta)
    }

    pub fn is_sound(self) -> bool {
        matches!(self, Self::Sound)
    }

    /// Inputs consumed by this kind; zero for every non-effect kind.
    pub fn input_count(self) -> usize {
        match self {
            Self::Effect(k) => k.input_count(),
            _ => 0,
        }
    }
}

/// Selection and state bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StripFlags {
    pub selected: bool,
    pub left_handle: bool,
    pub right_handle: bool,
    pub locked: bool,
    pub muted: bool,
    pub overlap: bool,
    /// Effect whose inputs do not intersect in time.
    pub invalid_effect: bool,
}

impl StripFlags {
    /// Clear selection and both handle bits.
    pub fn deselect(&mut self) {
        self.selected = false;
        self.left_handle = false;
        self.right_handle = false;
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub enabled: bool,
    /// Build sizes in percent of the source resolution (25, 50, 75, 100).
    pub sizes: Vec<u32>,
    pub overwrite: bool,
}

/// Owned reference to backing media.
///
/// Never shared between strips: duplication deep-copies it.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StripContent {
    /// Directory holding image-sequence elements or the media file.
    pub directory: String,
    /// Image-sequence element file names, one per content frame.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<String>,
    /// Movie/sound file name inside `directory`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Last known full source length in frames, before any animation offsets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_len: Option<Frame>,
    /// Referenced scene name for scene strips.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene: Option<String>,
    /// Caption of text effect strips.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub proxy: ProxySettings,
}

/// Snapshot of one strip's timing fields.
///
/// Captured before interactive edits and restored verbatim on cancel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TimingSnapshot {
    pub start: Frame,
    pub channel: Channel,
    pub start_still: Frame,
    pub end_still: Frame,
    pub start_disp: Frame,
    pub end_disp: Frame,
    pub start_ofs: Frame,
    pub end_ofs: Frame,
    pub anim_start_ofs: Frame,
    pub anim_end_ofs: Frame,
    pub len: Frame,
}

impl TimingSnapshot {
    pub fn disp_span(&self) -> FrameSpan {
        FrameSpan {
            start: self.start_disp,
            end: self.end_disp,
        }
    }
}

fn is_zero(v: &Frame) -> bool {
    *v == 0
}

fn default_channel() -> Channel {
    1
}

/// A single timed item on the timeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Strip {
    pub id: StripId,
    pub name: String,
    pub kind: StripKind,
    #[serde(default = "default_channel")]
    pub channel: Channel,

    pub start: Frame,
    pub len: Frame,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub start_ofs: Frame,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub end_ofs: Frame,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub start_still: Frame,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub end_still: Frame,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub anim_start_ofs: Frame,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub anim_end_ofs: Frame,

    /// Derived; recomputed by the timing engine.
    #[serde(default)]
    pub start_disp: Frame,
    /// Derived; recomputed by the timing engine.
    #[serde(default)]
    pub end_disp: Frame,

    #[serde(default)]
    pub flags: StripFlags,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<StripId>,
    #[serde(default)]
    pub inputs: [Option<StripId>; 3],
    #[serde(default)]
    pub content: StripContent,

    /// Nesting level, 0 at the root list. Maintained by the timeline.
    #[serde(skip)]
    pub depth: u32,
    #[serde(skip)]
    pub(crate) parent: Option<StripId>,
}

impl Strip {
    /// Create a strip of `kind` covering `len` content frames from `start`.
    ///
    /// The id is a placeholder until the strip is inserted into a timeline.
    pub fn new(
        name: impl Into<String>,
        kind: StripKind,
        channel: Channel,
        start: Frame,
        len: Frame,
    ) -> Self {
        Self {
            id: StripId(u32::MAX),
            name: name.into(),
            kind,
            channel: channel.max(1),
            start,
            len,
            start_ofs: 0,
            end_ofs: 0,
            start_still: 0,
            end_still: 0,
            anim_start_ofs: 0,
            anim_end_ofs: 0,
            start_disp: start,
            end_disp: start + len,
            flags: StripFlags::default(),
            children: Vec::new(),
            inputs: [None; 3],
            content: StripContent::default(),
            depth: 0,
            parent: None,
        }
    }

    pub fn movie(name: impl Into<String>, channel: Channel, start: Frame, len: Frame) -> Self {
        let mut s = Self::new(name, StripKind::Movie, channel, start, len);
        s.content.source_len = Some(len);
        s
    }

    pub fn sound(name: impl Into<String>, channel: Channel, start: Frame, len: Frame) -> Self {
        let mut s = Self::new(name, StripKind::Sound, channel, start, len);
        s.content.source_len = Some(len);
        s
    }

    /// Image sequence strip with one content frame per element.
    pub fn image(
        name: impl Into<String>,
        channel: Channel,
        start: Frame,
        elements: Vec<String>,
    ) -> Self {
        let len = elements.len() as Frame;
        let mut s = Self::new(name, StripKind::Image, channel, start, len);
        s.content.elements = elements;
        s
    }

    pub fn meta(name: impl Into<String>, channel: Channel) -> Self {
        Self::new(name, StripKind::Meta, channel, 0, 0)
    }

    /// Effect strip over `inputs`; timing is derived from the inputs on recalculation.
    pub fn effect(
        name: impl Into<String>,
        kind: EffectKind,
        channel: Channel,
        inputs: &[StripId],
    ) -> Self {
        let mut s = Self::new(name, StripKind::Effect(kind), channel, 0, 1);
        for (slot, id) in s.inputs.iter_mut().zip(inputs) {
            *slot = Some(*id);
        }
        s
    }

    pub fn with_selected(mut self, selected: bool) -> Self {
        self.flags.selected = selected;
        self
    }

    pub fn disp_span(&self) -> FrameSpan {
        FrameSpan {
            start: self.start_disp.min(self.end_disp),
            end: self.end_disp.max(self.start_disp),
        }
    }

    pub fn is_effect(&self) -> bool {
        self.kind.is_effect()
    }

    pub fn is_meta(&self) -> bool {
        self.kind.is_meta()
    }

    pub fn has_inputs(&self) -> bool {
        self.inputs.iter().any(Option::is_some)
    }

    pub fn input_ids(&self) -> impl Iterator<Item = StripId> + '_ {
        self.inputs.iter().flatten().copied()
    }

    pub fn snapshot(&self) -> TimingSnapshot {
        TimingSnapshot {
            start: self.start,
            channel: self.channel,
            start_still: self.start_still,
            end_still: self.end_still,
            start_disp: self.start_disp,
            end_disp: self.end_disp,
            start_ofs: self.start_ofs,
            end_ofs: self.end_ofs,
            anim_start_ofs: self.anim_start_ofs,
            anim_end_ofs: self.anim_end_ofs,
            len: self.len,
        }
    }

    pub fn restore(&mut self, ts: &TimingSnapshot) {
        self.start = ts.start;
        self.channel = ts.channel;
        self.start_still = ts.start_still;
        self.end_still = ts.end_still;
        self.start_disp = ts.start_disp;
        self.end_disp = ts.end_disp;
        self.start_ofs = ts.start_ofs;
        self.end_ofs = ts.end_ofs;
        self.anim_start_ofs = ts.anim_start_ofs;
        self.anim_end_ofs = ts.anim_end_ofs;
        self.len = ts.len;
    }
}
