//! Board profile definitions

/// USB vendor/product pair reported by a board's serial bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsbId {
    pub vid: u16,
    /// `None` matches any product from the vendor
    pub pid: Option<u16>,
}

impl UsbId {
    pub const fn new(vid: u16, pid: u16) -> Self {
        Self { vid, pid: Some(pid) }
    }

    pub const fn vendor(vid: u16) -> Self {
        Self { vid, pid: None }
    }

    pub fn matches(&self, vid: u16, pid: u16) -> bool {
        self.vid == vid && self.pid.map_or(true, |p| p == pid)
    }
}

/// A family of boards sharing serial defaults and USB identifiers
#[derive(Debug, Clone)]
pub struct BoardProfile {
    /// Short identifier (e.g., "uno")
    pub id: String,
    pub name: String,
    pub description: String,
    /// Baud rate sketches for this board are usually built with
    pub default_baud: u32,
    pub usb_ids: Vec<UsbId>,
}

impl BoardProfile {
    pub fn matches_usb(&self, vid: u16, pid: u16) -> bool {
        self.usb_ids.iter().any(|id| id.matches(vid, pid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usb_id_matching() {
        assert!(UsbId::new(0x2341, 0x0043).matches(0x2341, 0x0043));
        assert!(!UsbId::new(0x2341, 0x0043).matches(0x2341, 0x0042));
        assert!(UsbId::vendor(0x2341).matches(0x2341, 0x8036));
        assert!(!UsbId::vendor(0x2341).matches(0x0403, 0x6001));
    }
}
