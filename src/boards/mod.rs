//! Built-in board profiles
//!
//! Used to label ports in the port list and to pick a port automatically
//! when none is configured.

pub mod profile;

pub use profile::{BoardProfile, UsbId};

use once_cell::sync::Lazy;

/// Registry of built-in board profiles, most specific first
pub static BOARD_PROFILES: Lazy<Vec<BoardProfile>> = Lazy::new(|| {
    vec![
        BoardProfile {
            id: "uno".to_string(),
            name: "Arduino Uno".to_string(),
            description: "ATmega328P with ATmega16U2 USB bridge".to_string(),
            default_baud: 9600,
            usb_ids: vec![UsbId::new(0x2341, 0x0043), UsbId::new(0x2341, 0x0001)],
        },
        BoardProfile {
            id: "mega".to_string(),
            name: "Arduino Mega 2560".to_string(),
            description: "ATmega2560 with ATmega16U2 USB bridge".to_string(),
            default_baud: 9600,
            usb_ids: vec![UsbId::new(0x2341, 0x0042), UsbId::new(0x2341, 0x0010)],
        },
        BoardProfile {
            id: "leonardo".to_string(),
            name: "Arduino Leonardo".to_string(),
            description: "ATmega32U4 with native USB".to_string(),
            default_baud: 9600,
            usb_ids: vec![UsbId::new(0x2341, 0x8036), UsbId::new(0x2341, 0x0036)],
        },
        BoardProfile {
            id: "arduino".to_string(),
            name: "Arduino (other)".to_string(),
            description: "Any board with the official Arduino USB vendor ID".to_string(),
            default_baud: 9600,
            usb_ids: vec![UsbId::vendor(0x2341), UsbId::vendor(0x2a03)],
        },
        BoardProfile {
            id: "ch340".to_string(),
            name: "CH340 clone".to_string(),
            description: "Nano/Uno clones with a WCH CH340/CH341 bridge".to_string(),
            default_baud: 9600,
            usb_ids: vec![UsbId::new(0x1a86, 0x7523), UsbId::new(0x1a86, 0x5523)],
        },
        BoardProfile {
            id: "ftdi".to_string(),
            name: "FTDI bridge".to_string(),
            description: "Older Nano and Duemilanove boards with an FT232".to_string(),
            default_baud: 9600,
            usb_ids: vec![UsbId::vendor(0x0403)],
        },
        BoardProfile {
            id: "cp210x".to_string(),
            name: "CP210x bridge".to_string(),
            description: "ESP32/ESP8266 boards with a Silicon Labs bridge".to_string(),
            default_baud: 115200,
            usb_ids: vec![UsbId::new(0x10c4, 0xea60), UsbId::new(0x10c4, 0xea70)],
        },
    ]
});

/// Find the profile whose USB identifiers match a port
pub fn match_usb(vid: u16, pid: u16) -> Option<&'static BoardProfile> {
    BOARD_PROFILES.iter().find(|b| b.matches_usb(vid, pid))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specific_profile_wins() {
        assert_eq!(match_usb(0x2341, 0x0043).unwrap().id, "uno");
        assert_eq!(match_usb(0x2341, 0x0058).unwrap().id, "arduino");
        assert_eq!(match_usb(0x1a86, 0x7523).unwrap().id, "ch340");
        assert!(match_usb(0x046d, 0xc52b).is_none());
    }

    #[test]
    fn test_profile_ids_are_unique() {
        let mut ids: Vec<&str> = BOARD_PROFILES.iter().map(|b| b.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), BOARD_PROFILES.len());
    }

    #[test]
    fn test_profiles_are_well_formed() {
        for board in BOARD_PROFILES.iter() {
            assert!(!board.id.is_empty());
            assert!(!board.description.is_empty());
            assert!(board.default_baud > 0);
            assert!(!board.usb_ids.is_empty());
        }
    }
}
