use phf::{Map, phf_map};

pub const DEFAULT_COLORMAP: &str = "coolwarm";

static COLORMAP_ANCHORS: Map<&'static str, &'static [&'static str]> = phf_map! {
    "viridis" => &[
        "#440154", "#46327E", "#365C8D", "#277F8E",
        "#1FA187", "#4AC16D", "#A0DA39", "#FDE725",
    ],
    "coolwarm" => &[
        "#3B4CC0", "#688AEF", "#99BAFF", "#C9D8EF",
        "#F1CDBA", "#F08A6C", "#D14E41", "#B40426",
    ],
    "jet" => &[
        "#000080", "#0000FF", "#00FFFF", "#00FF00",
        "#FFFF00", "#FF0000", "#800000",
    ],
    "bwr" => &["#0000FF", "#FFFFFF", "#FF0000"],
    "gray" => &["#000000", "#FFFFFF"],
};

pub fn lookup(name: &str) -> Option<&'static [&'static str]> {
    COLORMAP_ANCHORS.get(name.to_ascii_lowercase().as_str()).copied()
}

pub fn known_names() -> impl Iterator<Item = &'static str> {
    COLORMAP_ANCHORS.keys().copied()
}

fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

fn lerp_channel(a: u8, b: u8, frac: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * frac).round() as u8
}

/// Samples the anchor list at a normalised position `t` in [0, 1] with
/// linear interpolation between neighbouring anchors. Out-of-range `t`
/// clamps to the nearest end.
pub fn sample(anchors: &[&str], t: f64) -> String {
    let t = t.clamp(0.0, 1.0);
    if anchors.len() == 1 {
        return anchors[0].to_string();
    }
    let position = t * (anchors.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = (lower + 1).min(anchors.len() - 1);
    let frac = position - lower as f64;

    let (ar, ag, ab) = parse_hex(anchors[lower]).unwrap_or((0, 0, 0));
    let (br, bg, bb) = parse_hex(anchors[upper]).unwrap_or((255, 255, 255));
    format!(
        "#{:02X}{:02X}{:02X}",
        lerp_channel(ar, br, frac),
        lerp_channel(ag, bg, frac),
        lerp_channel(ab, bb, frac)
    )
}

pub fn sample_by_name(name: &str, t: f64) -> Option<String> {
    lookup(name).map(|anchors| sample(anchors, t))
}

/// Evenly spaced colors for a categorical palette of `count` entries.
pub fn discrete_series(name: &str, count: usize) -> Option<Vec<String>> {
    let anchors = lookup(name)?;
    if count == 0 {
        return Some(Vec::new());
    }
    if count == 1 {
        return Some(vec![sample(anchors, 0.5)]);
    }
    Some(
        (0..count)
            .map(|i| sample(anchors, i as f64 / (count - 1) as f64))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert!(lookup("Coolwarm").is_some());
        assert!(lookup("VIRIDIS").is_some());
        assert!(lookup("no-such-map").is_none());
    }

    #[test]
    fn sample_hits_exact_anchors_at_ends() {
        let anchors = lookup("bwr").unwrap();
        assert_eq!(sample(anchors, 0.0), "#0000FF");
        assert_eq!(sample(anchors, 1.0), "#FF0000");
        assert_eq!(sample(anchors, 0.5), "#FFFFFF");
    }

    #[test]
    fn sample_interpolates_between_anchors() {
        let anchors = lookup("gray").unwrap();
        assert_eq!(sample(anchors, 0.5), "#808080");
    }

    #[test]
    fn sample_clamps_out_of_range_positions() {
        let anchors = lookup("gray").unwrap();
        assert_eq!(sample(anchors, -3.0), "#000000");
        assert_eq!(sample(anchors, 7.0), "#FFFFFF");
    }

    #[test]
    fn discrete_series_spans_the_map() {
        let series = discrete_series("bwr", 3).unwrap();
        assert_eq!(series, vec!["#0000FF", "#FFFFFF", "#FF0000"]);
        assert_eq!(discrete_series("bwr", 1).unwrap(), vec!["#FFFFFF"]);
        assert!(discrete_series("bwr", 0).unwrap().is_empty());
    }
}
