use ratatui::style::Color;

pub const BG_PRIMARY: Color = Color::Rgb(0, 0, 0);
pub const BG_PANEL: Color = Color::Rgb(12, 12, 12);
pub const FG_PRIMARY: Color = Color::Rgb(190, 190, 190);
pub const FG_DIM: Color = Color::Rgb(128, 128, 128);

pub const BAR_BG: Color = Color::Rgb(23, 52, 127);
pub const BAR_TEXT: Color = Color::Rgb(235, 240, 255);

pub const BORDER_IDLE: Color = Color::Rgb(61, 120, 120);
pub const BORDER_FOCUS: Color = Color::Rgb(187, 94, 0);
pub const LIST_HIGHLIGHT_BG: Color = Color::Rgb(142, 142, 142);
pub const LIST_HIGHLIGHT_FG: Color = Color::Rgb(255, 255, 255);

pub const SPEAKER_USER: Color = Color::Rgb(120, 160, 255);
pub const SPEAKER_AGENT: Color = Color::Rgb(120, 200, 140);
pub const MESSAGE_ERROR: Color = Color::Rgb(230, 90, 90);
pub const SUGGESTION_BG: Color = Color::Rgb(79, 79, 79);
pub const SUGGESTION_FG: Color = Color::Rgb(255, 210, 120);
pub const VALID_FG: Color = Color::Rgb(120, 200, 140);
