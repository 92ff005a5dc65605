use crate::foundation::core::Rgba8;

pub const BACKGROUND: Rgba8 = Rgba8::rgb(0x050505);
pub const PINK: Rgba8 = Rgba8::rgb(0xFF90E8);
pub const BLUE: Rgba8 = Rgba8::rgb(0x23A0FF);
pub const GREEN: Rgba8 = Rgba8::rgb(0x00FF94);
pub const YELLOW: Rgba8 = Rgba8::rgb(0xFFC900);
pub const WHITE: Rgba8 = Rgba8::rgb(0xFFFFFF);
pub const DIM_WHITE: Rgba8 = Rgba8 {
    a: 153,
    ..WHITE
};
pub const CARD: Rgba8 = Rgba8 { a: 20, ..WHITE };
pub const DISC: Rgba8 = Rgba8 { a: 26, ..WHITE };
pub const DOT_IDLE: Rgba8 = Rgba8 { a: 77, ..WHITE };
