//! iButton (Thermochron/Hygrochron) download dumps.
//!
//! Both iButton formats delimit a device's records with a download banner
//! (`Date/time logger downloaded:`) and a trailing end marker. The helpers
//! here locate those markers; [`multi`] and [`single`] build on them.

pub mod multi;
pub mod single;

pub use multi::parse_ibutton_multi;
pub use single::parse_ibutton_single;

use crate::constants::ibutton;

/// Indices of every line carrying the start-of-dump banner
pub(crate) fn find_start_markers(lines: &[String]) -> Vec<usize> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.contains(ibutton::START_MARKER))
        .map(|(i, _)| i)
        .collect()
}

/// Lines matching the first end marker of the vocabulary that occurs at all.
///
/// Returns the marker that matched alongside its line indices.
pub(crate) fn find_end_markers(lines: &[String]) -> Option<(&'static str, Vec<usize>)> {
    ibutton::END_MARKERS.iter().find_map(|marker| {
        let hits: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.to_lowercase().contains(marker))
            .map(|(i, _)| i)
            .collect();
        (!hits.is_empty()).then_some((*marker, hits))
    })
}

/// Keep only the alphanumeric characters of a serial number field
pub(crate) fn strip_punctuation(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}
