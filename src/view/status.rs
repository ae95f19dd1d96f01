//! Status tag colours

/// Colour of an opportunity status tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusColor {
    /// `abierta`
    Green,
    /// `en_proceso`
    Amber,
    /// `ganada`
    Blue,
    /// `perdida`
    Red,
    /// Any other status
    Slate,
}

impl StatusColor {
    pub fn from_status(status: &str) -> Self {
        match status {
            "abierta" => StatusColor::Green,
            "en_proceso" => StatusColor::Amber,
            "ganada" => StatusColor::Blue,
            "perdida" => StatusColor::Red,
            _ => StatusColor::Slate,
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            StatusColor::Green => "#10b981",
            StatusColor::Amber => "#f59e0b",
            StatusColor::Blue => "#2563eb",
            StatusColor::Red => "#ef4444",
            StatusColor::Slate => "#64748b",
        }
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            StatusColor::Green => (0x10, 0xb9, 0x81),
            StatusColor::Amber => (0xf5, 0x9e, 0x0b),
            StatusColor::Blue => (0x25, 0x63, 0xeb),
            StatusColor::Red => (0xef, 0x44, 0x44),
            StatusColor::Slate => (0x64, 0x74, 0x8b),
        }
    }
}

/// A coloured label attached to a record
#[derive(Debug, Clone, PartialEq)]
pub struct StatusTag {
    pub label: String,
    pub color: StatusColor,
}

impl StatusTag {
    pub fn new(status: impl Into<String>) -> Self {
        let label = status.into();
        let color = StatusColor::from_status(&label);
        Self { label, color }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_statuses() {
        assert_eq!(StatusColor::from_status("abierta").hex(), "#10b981");
        assert_eq!(StatusColor::from_status("en_proceso").hex(), "#f59e0b");
        assert_eq!(StatusColor::from_status("ganada").hex(), "#2563eb");
        assert_eq!(StatusColor::from_status("perdida").hex(), "#ef4444");
    }

    #[test]
    fn test_unknown_status_is_slate() {
        assert_eq!(StatusColor::from_status("cerrada"), StatusColor::Slate);
        assert_eq!(StatusColor::from_status(""), StatusColor::Slate);
        assert_eq!(StatusColor::from_status("ABIERTA").hex(), "#64748b");
    }

    #[test]
    fn test_rgb_matches_hex() {
        for color in [
            StatusColor::Green,
            StatusColor::Amber,
            StatusColor::Blue,
            StatusColor::Red,
            StatusColor::Slate,
        ] {
            let (r, g, b) = color.rgb();
            assert_eq!(format!("#{:02x}{:02x}{:02x}", r, g, b), color.hex());
        }
    }
}
