// Named background/text colour pairs for nodes.
//
// Values are the design-system CSS custom properties the host stylesheet
// defines, so they can be dropped into a style attribute unchanged.

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ColorPair {
    pub name: &'static str,
    pub bg: &'static str,
    pub text: &'static str,
}

pub const DEFAULT_NODE_COLOR: ColorPair = ColorPair {
    name: "gray",
    bg: "rgb(var(--ds-sub-gray))",
    text: "rgb(var(--ds-text-gray))",
};

macro_rules! pair {
    ($name:literal) => {
        ColorPair {
            name: $name,
            bg: concat!("rgb(var(--ds-sub-", $name, "))"),
            text: concat!("rgb(var(--ds-text-", $name, "))"),
        }
    };
}

pub const COLOR_PALETTE: [ColorPair; 9] = [
    pair!("gray"),
    pair!("red"),
    pair!("orange"),
    pair!("yellow"),
    pair!("green"),
    pair!("mint"),
    pair!("blue"),
    pair!("purple"),
    pair!("pink"),
];

pub fn pair_for(name: &str) -> Option<&'static ColorPair> {
    COLOR_PALETTE.iter().find(|p| p.name == name)
}

/// Text colour matching a palette background. Free-form colours have none.
pub fn text_for_background(bg: &str) -> Option<&'static str> {
    COLOR_PALETTE.iter().find(|p| p.bg == bg).map(|p| p.text)
}

/// Deterministic palette pick, wrapping around.
pub fn pair_at(index: usize) -> &'static ColorPair {
    &COLOR_PALETTE[index % COLOR_PALETTE.len()]
}
