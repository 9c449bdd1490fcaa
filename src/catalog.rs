//! Award vocabularies shared by the parser, cleaner, validator and analyzer.

/// Recognised award levels, in lookup order.
pub const AWARD_LEVELS: &[&str] = &["一等奖", "二等奖", "三等奖", "特等奖", "优秀奖", "提名奖"];

/// Recognised award types, in lookup order.
pub const AWARD_TYPES: &[&str] = &[
    "自然科学奖",
    "技术发明奖",
    "科技进步奖",
    "国际科技合作奖",
    "企业创新奖",
    "青年科技奖",
];

/// Type assigned by the cleaner when a snippet names no specific award type.
pub const GENERIC_AWARD_TYPE: &str = "科学技术奖";

/// Weight used for impact scoring when a level is missing or unknown.
pub const DEFAULT_LEVEL_WEIGHT: f64 = 1.0;

/// Returns the impact weight of an award level.
pub fn level_weight(level: Option<&str>) -> f64 {
    match level {
        Some("特等奖") => 5.0,
        Some("一等奖") => 4.0,
        Some("二等奖") => 3.0,
        Some("三等奖") => 2.0,
        Some("优秀奖") => 1.0,
        Some("提名奖") => 0.5,
        _ => DEFAULT_LEVEL_WEIGHT,
    }
}

/// Returns the first award level mentioned in `text`.
pub fn find_level(text: &str) -> Option<&'static str> {
    AWARD_LEVELS.iter().copied().find(|level| text.contains(level))
}

/// Returns the first award type mentioned in `text`.
pub fn find_type(text: &str) -> Option<&'static str> {
    AWARD_TYPES.iter().copied().find(|ty| text.contains(ty))
}

pub fn is_known_level(level: &str) -> bool {
    AWARD_LEVELS.contains(&level)
}

pub fn is_known_type(award_type: &str) -> bool {
    AWARD_TYPES.contains(&award_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_weights() {
        assert_eq!(level_weight(Some("特等奖")), 5.0);
        assert_eq!(level_weight(Some("提名奖")), 0.5);
        assert_eq!(level_weight(Some("金奖")), 1.0);
        assert_eq!(level_weight(None), 1.0);
    }

    #[test]
    fn test_find_level_uses_catalog_order() {
        assert_eq!(find_level("荣获二等奖和一等奖"), Some("一等奖"));
        assert_eq!(find_level("无等级"), None);
    }

    #[test]
    fn test_find_type() {
        assert_eq!(find_type("2021年度省科技进步奖名单"), Some("科技进步奖"));
        assert_eq!(find_type("科学技术奖"), None);
    }

    #[test]
    fn test_known_vocabulary() {
        assert!(is_known_level("优秀奖"));
        assert!(!is_known_level(GENERIC_AWARD_TYPE));
        assert!(is_known_type("青年科技奖"));
        assert!(!is_known_type(GENERIC_AWARD_TYPE));
    }
}
