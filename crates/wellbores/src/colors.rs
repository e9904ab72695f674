use serde::{Deserialize, Serialize};

pub type Rgb = [f32; 3];

/// Two-tone ribbon color plus the label background tint.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub col1: Rgb,
    pub col2: Rgb,
    pub label_bg: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Colors {
    pub font_color: u32,
    pub interact_font_color: u32,
    pub default: Color,
    pub highlight: Color,
    pub multi_highlight: Color,
    pub selected: Color,
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            font_color: 0x000000,
            interact_font_color: 0xFFFFFF,
            default: Color {
                col1: [0.3, 0.3, 0.3],
                col2: [0.05, 0.05, 0.05],
                label_bg: 0xFFFFFF,
            },
            highlight: Color {
                col1: [0.8, 0.2, 0.9],
                col2: [0.5, 0.05, 0.6],
                label_bg: 0xA30AA3,
            },
            multi_highlight: Color {
                col1: [0.55, 0.55, 0.55],
                col2: [0.3, 0.3, 0.3],
                label_bg: 0x666666,
            },
            selected: Color {
                col1: [1.0, 0.0, 0.0],
                col2: [0.5, 0.0, 0.0],
                label_bg: 0xFFFFFF,
            },
        }
    }
}

/// Partial color overrides; unset fields keep the default palette.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InputColors {
    pub font_color: Option<u32>,
    pub interact_font_color: Option<u32>,
    pub default_color1: Option<Rgb>,
    pub default_color2: Option<Rgb>,
    pub default_label_bg: Option<u32>,
    pub highlight_color1: Option<Rgb>,
    pub highlight_color2: Option<Rgb>,
    pub highlight_label_bg: Option<u32>,
    pub multi_highlight_color1: Option<Rgb>,
    pub multi_highlight_color2: Option<Rgb>,
    pub multi_highlight_label_bg: Option<u32>,
    pub selected_color1: Option<Rgb>,
    pub selected_color2: Option<Rgb>,
    pub selected_label_bg: Option<u32>,
}

fn apply(color: &mut Color, col1: Option<Rgb>, col2: Option<Rgb>, label_bg: Option<u32>) {
    if let Some(c) = col1 {
        color.col1 = c;
    }
    if let Some(c) = col2 {
        color.col2 = c;
    }
    // A zero background counts as unset.
    if let Some(bg) = label_bg.filter(|&bg| bg != 0) {
        color.label_bg = bg;
    }
}

impl Colors {
    pub fn from_input(input: &InputColors) -> Self {
        let mut out = Self::default();
        if let Some(c) = input.font_color {
            out.font_color = c;
        }
        if let Some(c) = input.interact_font_color {
            out.interact_font_color = c;
        }
        apply(
            &mut out.default,
            input.default_color1,
            input.default_color2,
            input.default_label_bg,
        );
        apply(
            &mut out.highlight,
            input.highlight_color1,
            input.highlight_color2,
            input.highlight_label_bg,
        );
        apply(
            &mut out.multi_highlight,
            input.multi_highlight_color1,
            input.multi_highlight_color2,
            input.multi_highlight_label_bg,
        );
        apply(
            &mut out.selected,
            input.selected_color1,
            input.selected_color2,
            input.selected_label_bg,
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::{Colors, InputColors};
    use pretty_assertions::assert_eq;

    #[test]
    fn overrides_only_given_fields() {
        let input = InputColors {
            font_color: Some(0x112233),
            highlight_color1: Some([0.0, 1.0, 0.0]),
            selected_label_bg: Some(0),
            ..InputColors::default()
        };
        let colors = Colors::from_input(&input);
        let defaults = Colors::default();
        assert_eq!(colors.font_color, 0x112233);
        assert_eq!(colors.highlight.col1, [0.0, 1.0, 0.0]);
        assert_eq!(colors.highlight.col2, defaults.highlight.col2);
        assert_eq!(colors.selected, defaults.selected);
        assert_eq!(colors.default, defaults.default);
    }

    #[test]
    fn input_parses_camel_case() {
        let input: InputColors =
            serde_json::from_str(r#"{"defaultColor1":[1,0,0],"multiHighlightLabelBg":255}"#).unwrap();
        let colors = Colors::from_input(&input);
        assert_eq!(colors.default.col1, [1.0, 0.0, 0.0]);
        assert_eq!(colors.multi_highlight.label_bg, 255);
    }
}
