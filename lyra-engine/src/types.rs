// Shared Types and Data Contracts
//
// This module defines the data contracts passed between the three tiers of
// the analysis pipeline. Each stage's signature is expressed in these types
// rather than loosely keyed maps, so a stage can only see what its upstream
// actually produced.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Clamp a value into [0.0, 1.0], mapping NaN to 0.0
pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Arithmetic mean, 0.0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

// ============================================================================
// Tier 1 Outputs: Sections
// ============================================================================

/// Structural role of a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionTag {
    Intro,
    Verse,
    PreChorus,
    Chorus,
    Bridge,
    Outro,
    Body,
}

impl SectionTag {
    /// Position in the canonical song order (unknown roles last)
    pub fn canonical_rank(self) -> u8 {
        match self {
            Self::Intro => 0,
            Self::Verse => 1,
            Self::PreChorus => 2,
            Self::Chorus => 3,
            Self::Bridge => 4,
            Self::Outro => 5,
            Self::Body => 6,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Intro => "Intro",
            Self::Verse => "Verse",
            Self::PreChorus => "Pre-Chorus",
            Self::Chorus => "Chorus",
            Self::Bridge => "Bridge",
            Self::Outro => "Outro",
            Self::Body => "Body",
        }
    }

    /// Recognise a bracketed tag label such as "Chorus 2", "Hook" or "후렴"
    ///
    /// Returns None for labels that name no known role; the segmenter keeps
    /// such labels verbatim on a `Body` section.
    pub fn from_label(label: &str) -> Option<Self> {
        let lowered = label.trim().to_lowercase();
        let base = lowered
            .trim_end_matches(|c: char| c.is_ascii_digit() || c.is_whitespace() || c == '#' || c == ':')
            .trim();

        match base {
            "intro" | "인트로" => Some(Self::Intro),
            "verse" | "벌스" | "절" => Some(Self::Verse),
            "pre-chorus" | "prechorus" | "pre chorus" | "pre" | "build" | "프리코러스" => {
                Some(Self::PreChorus)
            }
            "chorus" | "hook" | "refrain" | "후렴" | "코러스" => Some(Self::Chorus),
            "bridge" | "interlude" | "브릿지" | "간주" => Some(Self::Bridge),
            "outro" | "ending" | "coda" | "아웃트로" => Some(Self::Outro),
            _ => None,
        }
    }
}

impl fmt::Display for SectionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One segmented section of the input text
///
/// Created once per analysis call by the segmenter and never modified.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    /// Position in the original text (0-based)
    pub index: usize,
    pub tag: SectionTag,
    /// Display label; bracket labels are kept verbatim
    pub label: String,
    pub lines: Vec<String>,
    /// Index of the earlier section this one repeats, if any
    pub repeat_of: Option<usize>,
}

impl Section {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Segmentation branch chosen once per request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentationMode {
    Default,
    Longform,
}

// ============================================================================
// Emotion Model
// ============================================================================

/// Truth / Love / Pain axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TlpAxis {
    Truth,
    Love,
    Pain,
}

/// Truth/Love/Pain triple, each axis in [0, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TlpVector {
    pub truth: f64,
    pub love: f64,
    pub pain: f64,
}

impl TlpVector {
    pub fn new(truth: f64, love: f64, pain: f64) -> Self {
        Self {
            truth: clamp01(truth),
            love: clamp01(love),
            pain: clamp01(pain),
        }
    }

    pub fn get(&self, axis: TlpAxis) -> f64 {
        match axis {
            TlpAxis::Truth => self.truth,
            TlpAxis::Love => self.love,
            TlpAxis::Pain => self.pain,
        }
    }

    pub fn max(&self) -> f64 {
        self.truth.max(self.love).max(self.pain)
    }

    pub fn mean(&self) -> f64 {
        (self.truth + self.love + self.pain) / 3.0
    }

    pub fn sum(&self) -> f64 {
        self.truth + self.love + self.pain
    }

    /// Strongest axis; None when all axes are zero. Ties resolve T → L → P.
    pub fn dominant_axis(&self) -> Option<TlpAxis> {
        if self.max() <= 0.0 {
            return None;
        }
        [TlpAxis::Truth, TlpAxis::Love, TlpAxis::Pain]
            .into_iter()
            .fold(None, |best: Option<TlpAxis>, axis| match best {
                Some(b) if self.get(b) >= self.get(axis) => Some(b),
                _ => Some(axis),
            })
    }

    /// Component-wise mean of a set of vectors
    pub fn average<'a>(vectors: impl IntoIterator<Item = &'a TlpVector>) -> TlpVector {
        let mut sum = TlpVector::default();
        let mut n = 0usize;
        for v in vectors {
            sum.truth += v.truth;
            sum.love += v.love;
            sum.pain += v.pain;
            n += 1;
        }
        if n == 0 {
            return TlpVector::default();
        }
        TlpVector::new(sum.truth / n as f64, sum.love / n as f64, sum.pain / n as f64)
    }
}

/// Emotion clusters, in fixed tie-break order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionCluster {
    Rage,
    Despair,
    Fear,
    Tenderness,
    Longing,
    Joy,
    Hope,
    Epic,
    Reflection,
    Neutral,
}

pub const CLUSTER_COUNT: usize = 10;

impl EmotionCluster {
    pub const ALL: [EmotionCluster; CLUSTER_COUNT] = [
        Self::Rage,
        Self::Despair,
        Self::Fear,
        Self::Tenderness,
        Self::Longing,
        Self::Joy,
        Self::Hope,
        Self::Epic,
        Self::Reflection,
        Self::Neutral,
    ];

    /// Fixed cluster-to-axis mapping
    pub fn axis(self) -> Option<TlpAxis> {
        match self {
            Self::Rage | Self::Despair | Self::Fear => Some(TlpAxis::Pain),
            Self::Tenderness | Self::Longing | Self::Joy => Some(TlpAxis::Love),
            Self::Hope | Self::Epic | Self::Reflection => Some(TlpAxis::Truth),
            Self::Neutral => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rage => "rage",
            Self::Despair => "despair",
            Self::Fear => "fear",
            Self::Tenderness => "tenderness",
            Self::Longing => "longing",
            Self::Joy => "joy",
            Self::Hope => "hope",
            Self::Epic => "epic",
            Self::Reflection => "reflection",
            Self::Neutral => "neutral",
        }
    }

    /// Mood word used in prompts and as the computed mood default
    pub fn mood(self) -> &'static str {
        match self {
            Self::Rage => "furious",
            Self::Despair => "melancholic",
            Self::Fear => "ominous",
            Self::Tenderness => "tender",
            Self::Longing => "wistful",
            Self::Joy => "euphoric",
            Self::Hope => "hopeful",
            Self::Epic => "triumphant",
            Self::Reflection => "reflective",
            Self::Neutral => "calm",
        }
    }

    pub fn color(self) -> EmotionColor {
        match self {
            Self::Rage => EmotionColor::Crimson,
            Self::Despair => EmotionColor::Midnight,
            Self::Fear => EmotionColor::Violet,
            Self::Tenderness => EmotionColor::Rose,
            Self::Longing => EmotionColor::Indigo,
            Self::Joy => EmotionColor::Gold,
            Self::Hope => EmotionColor::Dawn,
            Self::Epic => EmotionColor::Ember,
            Self::Reflection => EmotionColor::Silver,
            Self::Neutral => EmotionColor::Grey,
        }
    }
}

impl fmt::Display for EmotionCluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-cluster scores, each in [0, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClusterVector(pub [f64; CLUSTER_COUNT]);

impl ClusterVector {
    pub fn get(&self, cluster: EmotionCluster) -> f64 {
        self.0[cluster.index()]
    }

    pub fn set(&mut self, cluster: EmotionCluster, value: f64) {
        self.0[cluster.index()] = clamp01(value);
    }

    pub fn max(&self) -> f64 {
        self.0.iter().copied().fold(0.0, f64::max)
    }

    /// Highest-scoring cluster; earlier clusters win ties; Neutral when empty
    pub fn argmax(&self) -> EmotionCluster {
        let mut best = EmotionCluster::Neutral;
        let mut best_score = 0.0;
        for cluster in EmotionCluster::ALL {
            let score = self.get(cluster);
            if score > best_score {
                best = cluster;
                best_score = score;
            }
        }
        best
    }

    pub fn average<'a>(vectors: impl IntoIterator<Item = &'a ClusterVector>) -> ClusterVector {
        let mut sum = [0.0; CLUSTER_COUNT];
        let mut n = 0usize;
        for v in vectors {
            for (acc, value) in sum.iter_mut().zip(v.0.iter()) {
                *acc += value;
            }
            n += 1;
        }
        if n == 0 {
            return ClusterVector::default();
        }
        ClusterVector(sum.map(|s| clamp01(s / n as f64)))
    }
}

impl Serialize for ClusterVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(CLUSTER_COUNT))?;
        for cluster in EmotionCluster::ALL {
            map.serialize_entry(cluster.as_str(), &self.get(cluster))?;
        }
        map.end()
    }
}

/// Which axis a phrase lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactZone {
    Truth,
    Love,
    Pain,
    Mixed,
}

/// Emotion vector for a single phrase
///
/// One per phrase; consumed by the aggregator and not persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhraseEmotionPacket {
    pub text: String,
    pub tlp: TlpVector,
    pub clusters: ClusterVector,
    /// love − pain, in [-1, 1]
    pub valence: f64,
    /// Mean of the three axes, in [0, 1]
    pub arousal: f64,
    /// Confidence in [0, 1]
    pub weight: f64,
    pub impact_zone: ImpactZone,
    pub lexicon_hits: usize,
    /// Total punctuation/emphasis bonus applied
    pub emphasis: f64,
}

/// Shape of the emotional trajectory inside a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveShape {
    Flat,
    Spike,
    Rising,
    Falling,
}

/// Aggregated emotion for one non-empty section
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionEmotionWave {
    pub section_index: usize,
    pub tag: SectionTag,
    pub label: String,
    pub tlp: TlpVector,
    pub clusters: ClusterVector,
    pub dominant_cluster: EmotionCluster,
    pub intensity: f64,
    pub valence: f64,
    pub arousal: f64,
    pub shape: WaveShape,
    pub phrase_count: usize,
}

/// Church mode carried by a modal key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalKind {
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
}

impl ModalKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dorian => "dorian",
            Self::Phrygian => "phrygian",
            Self::Lydian => "lydian",
            Self::Mixolydian => "mixolydian",
        }
    }
}

/// Tonal mode
///
/// Serializes as its family ("major", "minor", "modal"); the modal kind is
/// carried by the key's display form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Major,
    Minor,
    Modal(ModalKind),
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Modal(_) => "modal",
        }
    }

    /// Name used after the tonic, e.g. "minor" or "mixolydian"
    pub fn key_suffix(self) -> &'static str {
        match self {
            Self::Modal(kind) => kind.as_str(),
            other => other.as_str(),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Mode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// BPM/key/genre nudge derived from the dominant cluster
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DynamicBias {
    pub bpm_delta: f64,
    pub key_hint: Option<Mode>,
    pub genre_hint: Option<GenreDomain>,
}

impl DynamicBias {
    pub fn is_neutral(&self) -> bool {
        self.bpm_delta == 0.0 && self.key_hint.is_none() && self.genre_hint.is_none()
    }
}

/// Song-level emotion curve built from the section waves
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalEmotionCurve {
    /// One wave per non-empty section, in section order
    pub waves: Vec<SectionEmotionWave>,
    /// Section indices of `waves` in canonical structural order
    /// (Intro, Verse, Pre-Chorus, Chorus, Bridge, Outro, others last; stable)
    pub canonical_order: Vec<usize>,
    pub tlp: TlpVector,
    pub cluster_means: ClusterVector,
    pub dominant_cluster: EmotionCluster,
    pub mean_intensity: f64,
    pub valence: f64,
    pub arousal: f64,
    /// Section indices within the tolerance band of the maximum intensity
    pub peak_sections: Vec<usize>,
    /// Section indices within the tolerance band of the minimum intensity
    pub valley_sections: Vec<usize>,
    /// 1 − standard deviation of section intensities
    pub resonance: f64,
    /// Normalised entropy of the dominant-cluster distribution
    pub entropy: f64,
    pub bias: DynamicBias,
}

// ============================================================================
// Genre Types
// ============================================================================

/// First-stage genre family, declared in tie-break priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenreDomain {
    Hard,
    Electronic,
    Jazz,
    Lyrical,
    Cinematic,
    Comedy,
    Soft,
}

impl GenreDomain {
    pub const ALL: [GenreDomain; 7] = [
        Self::Hard,
        Self::Electronic,
        Self::Jazz,
        Self::Lyrical,
        Self::Cinematic,
        Self::Comedy,
        Self::Soft,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hard => "hard",
            Self::Electronic => "electronic",
            Self::Jazz => "jazz",
            Self::Lyrical => "lyrical",
            Self::Cinematic => "cinematic",
            Self::Comedy => "comedy",
            Self::Soft => "soft",
        }
    }
}

impl fmt::Display for GenreDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a genre candidate was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenreSource {
    /// Explicit genre short-circuited scoring
    Explicit,
    /// Highest-scoring qualifying domain
    Scored,
    /// Domain changed by a redirect rule
    Redirected,
    /// No domain qualified; highest raw score used
    Fallback,
}

/// Score of one domain during stage 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DomainScore {
    pub domain: GenreDomain,
    pub score: f64,
    pub threshold: f64,
    pub qualified: bool,
}

/// Result of genre inference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreCandidate {
    pub domain: GenreDomain,
    pub genre_id: String,
    pub raw_score: f64,
    pub threshold: f64,
    pub source: GenreSource,
    pub redirected_from: Option<GenreDomain>,
    pub domain_scores: Vec<DomainScore>,
}

// ============================================================================
// Rhythm & Tonality Types
// ============================================================================

pub const BPM_BOUNDARY_MIN: f64 = 40.0;
pub const BPM_BOUNDARY_MAX: f64 = 200.0;

/// BPM lock flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BpmLocks {
    /// Estimate was set by an override
    pub user_locked: bool,
    /// Estimate was clamped into the allowed range
    pub clamp_applied: bool,
}

/// Global tempo estimate with per-section curve
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BpmProfile {
    pub estimate: f64,
    /// One value per section, each within the configured delta of `estimate`
    pub curve: Vec<f64>,
    pub locks: BpmLocks,
    /// Curve range exceeded the fracture threshold
    pub fracture: bool,
}

impl BpmProfile {
    pub fn range(&self) -> f64 {
        let max = self.curve.iter().copied().fold(f64::MIN, f64::max);
        let min = self.curve.iter().copied().fold(f64::MAX, f64::min);
        if self.curve.is_empty() {
            0.0
        } else {
            max - min
        }
    }
}

const PITCH_NAMES: [&str; 12] = [
    "C", "C#", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B",
];

/// A tonic pitch class plus mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MusicalKey {
    /// Pitch class 0 (C) through 11 (B)
    pub tonic: u8,
    pub mode: Mode,
}

impl MusicalKey {
    pub fn new(tonic: u8, mode: Mode) -> Self {
        Self {
            tonic: tonic % 12,
            mode,
        }
    }

    pub fn tonic_name(&self) -> &'static str {
        PITCH_NAMES[(self.tonic % 12) as usize]
    }

    /// Parse forms like "A minor", "Am", "F# major", "Bb", "D dorian", "C# min"
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim();
        let mut chars = s.chars();
        let letter = chars.next()?.to_ascii_uppercase();
        let mut tonic: i32 = match letter {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return None,
        };

        let rest: String = chars.collect();
        let mut rest = rest.as_str();
        if let Some(stripped) = rest.strip_prefix('#').or_else(|| rest.strip_prefix('♯')) {
            tonic += 1;
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix('b').or_else(|| rest.strip_prefix('♭')) {
            tonic -= 1;
            rest = stripped;
        }

        let suffix = rest.trim().to_lowercase();
        let mode = match suffix.as_str() {
            "" | "maj" | "major" => Mode::Major,
            "m" | "min" | "minor" => Mode::Minor,
            "dorian" | "modal" => Mode::Modal(ModalKind::Dorian),
            "phrygian" => Mode::Modal(ModalKind::Phrygian),
            "lydian" => Mode::Modal(ModalKind::Lydian),
            "mixolydian" => Mode::Modal(ModalKind::Mixolydian),
            _ => return None,
        };

        Some(Self::new(tonic.rem_euclid(12) as u8, mode))
    }

    /// Relative minor of a major key (and the identity otherwise)
    pub fn relative_minor(&self) -> Self {
        match self.mode {
            Mode::Major => Self::new(self.tonic + 9, Mode::Minor),
            _ => *self,
        }
    }
}

impl fmt::Display for MusicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tonic_name(), self.mode.key_suffix())
    }
}

impl Serialize for MusicalKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Key and mode per section
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TonalityProfile {
    pub mode: Mode,
    /// One key per section
    pub section_keys: Vec<MusicalKey>,
    /// Section indices whose mode differs from the previous section
    pub modal_shifts: Vec<usize>,
    /// Key used for the style prompt
    pub primary_key: MusicalKey,
}

// ============================================================================
// Vocal / Instrumentation / Color
// ============================================================================

/// Vocal gender preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VocalGender {
    Male,
    Female,
    Duet,
    Neutral,
}

impl VocalGender {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "male" | "m" | "man" | "남성" | "남자" => Some(Self::Male),
            "female" | "f" | "woman" | "여성" | "여자" => Some(Self::Female),
            "duet" | "mixed" | "both" | "혼성" => Some(Self::Duet),
            "neutral" | "any" | "auto" => Some(Self::Neutral),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Duet => "duet",
            Self::Neutral => "neutral",
        }
    }
}

/// Vocal delivery description
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VocalProfile {
    pub gender: VocalGender,
    #[serde(rename = "type")]
    pub vocal_type: String,
    pub tone: String,
    pub style: String,
}

/// Instrument selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentationProfile {
    pub selection: Vec<String>,
    pub palette: String,
}

/// Named color attached to an emotion cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionColor {
    Crimson,
    Midnight,
    Violet,
    Rose,
    Indigo,
    Gold,
    Dawn,
    Ember,
    Silver,
    Grey,
}

impl EmotionColor {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Crimson => "crimson",
            Self::Midnight => "midnight blue",
            Self::Violet => "violet",
            Self::Rose => "rose",
            Self::Indigo => "indigo",
            Self::Gold => "gold",
            Self::Dawn => "dawn orange",
            Self::Ember => "ember",
            Self::Silver => "silver",
            Self::Grey => "grey",
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            Self::Crimson => "#B0102A",
            Self::Midnight => "#1B2A4A",
            Self::Violet => "#4B2A6B",
            Self::Rose => "#E8909C",
            Self::Indigo => "#3F3D8F",
            Self::Gold => "#F2C230",
            Self::Dawn => "#F59A4A",
            Self::Ember => "#C8502A",
            Self::Silver => "#B8BEC6",
            Self::Grey => "#8A8A8A",
        }
    }
}

/// Color of one section in the color wave
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorPoint {
    pub section_index: usize,
    pub label: String,
    pub color: EmotionColor,
    pub hex: String,
}

/// Song-level color summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorProfile {
    pub dominant: EmotionColor,
    pub secondary: Option<EmotionColor>,
    pub hex: String,
}

/// Color wave plus song-level profile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorAnnotation {
    pub wave: Vec<ColorPoint>,
    pub profile: ColorProfile,
}

// ============================================================================
// Request Types
// ============================================================================

/// User-specified overrides; every field is independently optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserOverrides {
    pub preferred_gender: Option<VocalGender>,
    pub bpm: Option<f64>,
    pub key: Option<String>,
    pub genre: Option<String>,
    pub mood: Option<String>,
    pub vocal_profile: Option<String>,
    pub instrumentation: Option<Vec<String>>,
    pub structure_hints: Option<Vec<String>>,
}

impl UserOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Summary produced by an upstream fusion layer
///
/// Ranks below user overrides and above the legacy engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticHints {
    pub bpm: Option<f64>,
    pub key: Option<String>,
    pub genre: Option<String>,
    pub mood: Option<String>,
    pub vocal_gender: Option<VocalGender>,
    pub instrumentation: Vec<String>,
}

impl SemanticHints {
    /// Combine two hint sets into a new one
    ///
    /// Per field: a `Some` in `overlay` replaces `base`; a non-empty list in
    /// `overlay` replaces `base`'s list. Neither input is modified.
    pub fn merge(base: &SemanticHints, overlay: &SemanticHints) -> SemanticHints {
        SemanticHints {
            bpm: overlay.bpm.or(base.bpm),
            key: overlay.key.clone().or_else(|| base.key.clone()),
            genre: overlay.genre.clone().or_else(|| base.genre.clone()),
            mood: overlay.mood.clone().or_else(|| base.mood.clone()),
            vocal_gender: overlay.vocal_gender.or(base.vocal_gender),
            instrumentation: if overlay.instrumentation.is_empty() {
                base.instrumentation.clone()
            } else {
                overlay.instrumentation.clone()
            },
        }
    }
}

/// One analysis request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisRequest {
    pub text: String,
    pub overrides: UserOverrides,
    pub hints: Option<SemanticHints>,
}

impl AnalysisRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_overrides(mut self, overrides: UserOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_hints(mut self, hints: SemanticHints) -> Self {
        self.hints = Some(hints);
        self
    }
}
