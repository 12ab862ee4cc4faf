//! TGIF talkgroup management through the hotspot's `tgif_manager.php`.
//!
//! Link state is scraped from `tgif_links.php`; when the hotspot cannot
//! report it, the last talkgroup linked through this daemon is kept per slot.

use std::sync::{Mutex, PoisonError};

use regex::{Regex, RegexBuilder};
use serde::Serialize;

/// Manager page accepting link/unlink form posts.
pub const MANAGER_PATH: &str = "/mmdvmhost/tgif_manager.php";

/// Status page rendering the current slot table.
pub const LINKS_PATH: &str = "/mmdvmhost/tgif_links.php";

/// Talkgroup used when the requested one is not a valid id.
pub const FALLBACK_TALKGROUP: &str = "777";

/// Largest talkgroup id accepted for a link request.
pub const MAX_TALKGROUP: i64 = 99_999_999;

/// Slot contents scraped from the status page. `None` means unlinked or unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SlotLinks {
    pub slot1: Option<String>,
    pub slot2: Option<String>,
}

/// Extracts slot talkgroups from `tgif_links.php` HTML.
pub struct TgifScraper {
    cell: Regex,
    tag: Regex,
    talkgroup: Regex,
}

impl TgifScraper {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            cell: RegexBuilder::new(r"<td[^>]*>([\s\S]*?)</td>")
                .case_insensitive(true)
                .build()?,
            tag: Regex::new(r"<[^>]*>")?,
            talkgroup: RegexBuilder::new(r"TG\s*([0-9]+)")
                .case_insensitive(true)
                .build()?,
        })
    }

    /// Slot values from table cells, in order.
    ///
    /// A cell counts when it contains `TG<n>` (the number is taken) or is
    /// exactly `None`. The first such cell is slot 1, the second slot 2.
    pub fn parse(&self, html: &str) -> SlotLinks {
        let mut values = self.cell.captures_iter(html).filter_map(|caps| {
            let inner = caps.get(1).map_or("", |m| m.as_str());
            let text = self.tag.replace_all(inner, "");
            let text = text.trim();
            if let Some(tg) = self.talkgroup.captures(text).and_then(|c| c.get(1)) {
                Some(Some(tg.as_str().to_owned()))
            } else if text == "None" {
                Some(None)
            } else {
                None
            }
        });

        SlotLinks {
            slot1: values.next().flatten(),
            slot2: values.next().flatten(),
        }
    }
}

/// Talkgroups linked through this daemon, per slot.
#[derive(Debug, Default)]
pub struct LastLinked {
    slots: Mutex<SlotLinks>,
}

impl LastLinked {
    /// Record a link (`Some`) or unlink (`None`) on slot 1 or 2.
    pub fn set(&self, slot: u8, talkgroup: Option<String>) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if slot == 1 {
            slots.slot1 = talkgroup;
        } else {
            slots.slot2 = talkgroup;
        }
    }

    pub fn get(&self) -> SlotLinks {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Form body for a link request.
pub fn link_form(slot: u8, talkgroup: &str) -> String {
    format!("tgifSubmit=1&tgifSlot={slot}&tgifNumber={talkgroup}&tgifAction=LINK")
}

/// Form body for an unlink request.
pub fn unlink_form(slot: u8) -> String {
    format!("tgifSubmit=1&tgifSlot={slot}&tgifAction=UNLINK")
}

/// Talkgroup id from a parsed request value, falling back to [`FALLBACK_TALKGROUP`].
pub fn talkgroup_or_fallback(parsed: Option<i64>) -> String {
    parsed
        .filter(|tg| (1..=MAX_TALKGROUP).contains(tg))
        .map_or_else(|| FALLBACK_TALKGROUP.to_owned(), |tg| tg.to_string())
}

/// Slot 1 or 2 from a parsed request value. Missing or zero means slot 2.
pub fn slot_or_default(parsed: Option<i64>) -> u8 {
    match parsed.filter(|n| *n != 0).unwrap_or(2) {
        n if n <= 1 => 1,
        _ => 2,
    }
}

/// Error text for a hotspot that answered with a failure status.
pub fn proxy_error_message(status: u16, base: &str) -> String {
    format!("Hotspot returned {status}. {}", check_hint(base))
}

/// Error text for a hotspot that could not be reached at all.
pub fn unreachable_message(error: &str, base: &str) -> String {
    format!("Could not reach hotspot: {error}. {}", check_hint(base))
}

fn check_hint(base: &str) -> String {
    format!(
        "Check wpsd.host ({base}), wpsd.username and wpsd.password in the [wpsd] config section \
         and that the hotspot admin is reachable (same URL as TGIF Manager in the browser)."
    )
}
