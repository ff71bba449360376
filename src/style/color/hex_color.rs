use crate::error::UiError;
use crate::style::Color;

pub fn parse_hex(raw: &str) -> crate::Result<Color> {
    let bytes = raw.as_bytes();
    if !validate(bytes) {
        return Err(UiError::InvalidColor(raw.to_string()));
    }
    let [r, g, b, a] = match bytes.len() {
        4 => [
            hex_1_to_u8(bytes[1]) * 17,
            hex_1_to_u8(bytes[2]) * 17,
            hex_1_to_u8(bytes[3]) * 17,
            255,
        ],
        5 => [
            hex_1_to_u8(bytes[1]) * 17,
            hex_1_to_u8(bytes[2]) * 17,
            hex_1_to_u8(bytes[3]) * 17,
            hex_1_to_u8(bytes[4]) * 17,
        ],
        7 => [
            hex_2_to_u8(bytes[1], bytes[2]),
            hex_2_to_u8(bytes[3], bytes[4]),
            hex_2_to_u8(bytes[5], bytes[6]),
            255,
        ],
        _ => [
            hex_2_to_u8(bytes[1], bytes[2]),
            hex_2_to_u8(bytes[3], bytes[4]),
            hex_2_to_u8(bytes[5], bytes[6]),
            hex_2_to_u8(bytes[7], bytes[8]),
        ],
    };
    Ok(Color::rgba(r, g, b, a))
}

pub fn to_hex(color: Color) -> String {
    let [r, g, b, a] = color.to_rgba_u8();
    if a == 255 {
        format!("#{r:02x}{g:02x}{b:02x}")
    } else {
        format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
    }
}

fn validate(bytes: &[u8]) -> bool {
    let length = bytes.len();
    if length == 0 || bytes[0] != b'#' {
        return false;
    }
    if length != 4 && length != 5 && length != 7 && length != 9 {
        return false;
    }
    bytes[1..].iter().all(u8::is_ascii_hexdigit)
}

fn hex_1_to_u8(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}

fn hex_2_to_u8(c1: u8, c2: u8) -> u8 {
    (hex_1_to_u8(c1) << 4) | hex_1_to_u8(c2)
}
