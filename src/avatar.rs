use crate::error::WorkspaceError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// 8-bit RGBA colour, serialized as a `#RRGGBB` / `#RRGGBBAA` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex(raw: &str) -> Result<Self, WorkspaceError> {
        let invalid = || WorkspaceError::InvalidColor(raw.to_string());
        let digits = raw.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) || !(digits.len() == 6 || digits.len() == 8) {
            return Err(invalid());
        }
        let channel = |idx: usize| u8::from_str_radix(&digits[idx..idx + 2], 16).map_err(|_| invalid());
        let a = if digits.len() == 8 { channel(6)? } else { 0xFF };
        Ok(Self { r: channel(0)?, g: channel(2)?, b: channel(4)?, a })
    }

    pub fn to_hex(self) -> String {
        if self.a == 0xFF {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// Normalized channels for renderer uniforms.
    pub fn to_vec4(self) -> glam::Vec4 {
        glam::Vec4::new(self.r as f32, self.g as f32, self.b as f32, self.a as f32) / 255.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Color {
    type Error = WorkspaceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_hex()
    }
}

/// Skin tones offered by the customizer.
pub const SKIN_TONES: [Color; 8] = [
    Color::rgb(0xFD, 0xBC, 0xB4),
    Color::rgb(0xF1, 0xC2, 0x7D),
    Color::rgb(0xE0, 0xAC, 0x69),
    Color::rgb(0xC6, 0x86, 0x42),
    Color::rgb(0x8D, 0x55, 0x24),
    Color::rgb(0x6B, 0x44, 0x23),
    Color::rgb(0x4A, 0x2C, 0x2A),
    Color::rgb(0x2D, 0x1B, 0x1B),
];

/// Slider value in `[0, 100]`. Out-of-range inputs saturate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct Percent(u8);

impl Percent {
    pub const MIN: Percent = Percent(0);
    pub const MID: Percent = Percent(50);
    pub const MAX: Percent = Percent(100);

    pub fn new(value: u8) -> Self {
        Percent(value.min(100))
    }

    pub fn from_f32(value: f32) -> Self {
        if value.is_nan() {
            return Percent::MID;
        }
        Percent(value.round().clamp(0.0, 100.0) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn fraction(self) -> f32 {
        self.0 as f32 / 100.0
    }
}

impl Default for Percent {
    fn default() -> Self {
        Percent::MID
    }
}

impl From<u8> for Percent {
    fn from(value: u8) -> Self {
        Percent::new(value)
    }
}

impl From<Percent> for u8 {
    fn from(value: Percent) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HairStyle {
    Short,
    Medium,
    Long,
    Curly,
    Bald,
}

impl HairStyle {
    pub const ALL: [HairStyle; 5] =
        [HairStyle::Short, HairStyle::Medium, HairStyle::Long, HairStyle::Curly, HairStyle::Bald];

    pub fn label(self) -> &'static str {
        match self {
            HairStyle::Short => "Short",
            HairStyle::Medium => "Medium",
            HairStyle::Long => "Long",
            HairStyle::Curly => "Curly",
            HairStyle::Bald => "Bald",
        }
    }
}

impl Default for HairStyle {
    fn default() -> Self {
        HairStyle::Short
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Clothing {
    BusinessSuit,
    CasualShirt,
    Sweater,
    Blazer,
}

impl Clothing {
    pub const ALL: [Clothing; 4] =
        [Clothing::BusinessSuit, Clothing::CasualShirt, Clothing::Sweater, Clothing::Blazer];

    pub fn label(self) -> &'static str {
        match self {
            Clothing::BusinessSuit => "Business Suit",
            Clothing::CasualShirt => "Casual Shirt",
            Clothing::Sweater => "Sweater",
            Clothing::Blazer => "Blazer",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Clothing::BusinessSuit => Color::rgb(0x1F, 0x29, 0x37),
            Clothing::CasualShirt => Color::rgb(0x3B, 0x82, 0xF6),
            Clothing::Sweater => Color::rgb(0x05, 0x96, 0x69),
            Clothing::Blazer => Color::rgb(0x7C, 0x3A, 0xED),
        }
    }
}

impl Default for Clothing {
    fn default() -> Self {
        Clothing::BusinessSuit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Accessory {
    Glasses,
    Tie,
    Watch,
    Badge,
}

impl Accessory {
    pub const ALL: [Accessory; 4] = [Accessory::Glasses, Accessory::Tie, Accessory::Watch, Accessory::Badge];

    pub fn label(self) -> &'static str {
        match self {
            Accessory::Glasses => "Glasses",
            Accessory::Tie => "Tie",
            Accessory::Watch => "Watch",
            Accessory::Badge => "Badge",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FacialFeature {
    EyeSize,
    NoseSize,
    MouthSize,
    EyebrowThickness,
}

impl FacialFeature {
    pub const ALL: [FacialFeature; 4] = [
        FacialFeature::EyeSize,
        FacialFeature::NoseSize,
        FacialFeature::MouthSize,
        FacialFeature::EyebrowThickness,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FacialFeature::EyeSize => "Eye Size",
            FacialFeature::NoseSize => "Nose Size",
            FacialFeature::MouthSize => "Mouth Size",
            FacialFeature::EyebrowThickness => "Eyebrow Thickness",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarConfig {
    pub skin_tone: Color,
    #[serde(default)]
    pub hair_style: HairStyle,
    #[serde(default)]
    pub clothing: Clothing,
    #[serde(default)]
    pub accessories: BTreeSet<Accessory>,
    #[serde(default = "AvatarConfig::default_features")]
    pub facial_features: BTreeMap<FacialFeature, Percent>,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            skin_tone: SKIN_TONES[2],
            hair_style: HairStyle::default(),
            clothing: Clothing::default(),
            accessories: BTreeSet::new(),
            facial_features: Self::default_features(),
        }
    }
}

impl AvatarConfig {
    fn default_features() -> BTreeMap<FacialFeature, Percent> {
        FacialFeature::ALL.iter().map(|feature| (*feature, Percent::MID)).collect()
    }

    pub fn feature(&self, feature: FacialFeature) -> Percent {
        self.facial_features.get(&feature).copied().unwrap_or_default()
    }

    pub fn has_accessory(&self, accessory: Accessory) -> bool {
        self.accessories.contains(&accessory)
    }

    /// Adds the accessory if absent, removes it otherwise. Returns whether it is now worn.
    pub fn toggle_accessory(&mut self, accessory: Accessory) -> bool {
        if self.accessories.remove(&accessory) {
            false
        } else {
            self.accessories.insert(accessory);
            true
        }
    }

    pub fn apply(&mut self, edit: DraftEdit) {
        match edit {
            DraftEdit::SkinTone(color) => self.skin_tone = color,
            DraftEdit::HairStyle(style) => self.hair_style = style,
            DraftEdit::Clothing(clothing) => self.clothing = clothing,
            DraftEdit::Feature(feature, value) => {
                self.facial_features.insert(feature, value);
            }
        }
    }
}

/// A single field edit applied to an avatar draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftEdit {
    SkinTone(Color),
    HairStyle(HairStyle),
    Clothing(Clothing),
    Feature(FacialFeature, Percent),
}

impl fmt::Display for DraftEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftEdit::SkinTone(color) => write!(f, "skin_tone={color}"),
            DraftEdit::HairStyle(style) => write!(f, "hair_style={}", style.label()),
            DraftEdit::Clothing(clothing) => write!(f, "clothing={}", clothing.label()),
            DraftEdit::Feature(feature, value) => write!(f, "{}={}%", feature.label(), value.get()),
        }
    }
}
