//! Descriptive statistics over award tables.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::catalog::level_weight;
use crate::processor::AwardTables;

/// Label used when a project or winner has no organization.
pub const UNKNOWN_REGION: &str = "未知";

const TOP_COLLABORATIONS: usize = 10;
const TOP_KEYWORDS: usize = 20;
const TOP_IMPACT: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicStats {
    pub total_awards: usize,
    pub total_projects: usize,
    pub total_winners: usize,
    pub year_range: YearRange,
    pub award_types: BTreeMap<String, usize>,
    pub award_levels: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyStat {
    pub year: i32,
    pub award_count: usize,
    pub level_distribution: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeStat {
    pub award_type: String,
    pub count: usize,
    pub level_distribution: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationStat {
    pub organization: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerStat {
    pub name: String,
    pub count: usize,
    /// Organization on the winner's last row.
    pub latest_organization: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub yearly_counts: BTreeMap<i32, usize>,
    pub type_trends: BTreeMap<i32, BTreeMap<String, usize>>,
    pub level_trends: BTreeMap<i32, BTreeMap<String, usize>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionStat {
    pub region: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaboration {
    pub organizations: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaborationAnalysis {
    /// Projects credited to exactly one distinct organization.
    pub single_org: usize,
    /// Projects credited to more than one distinct organization.
    pub multi_org: usize,
    pub max_orgs: usize,
    pub top_collaborations: Vec<Collaboration>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordStat {
    pub keyword: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactScore {
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactAnalysis {
    pub top_organizations: Vec<ImpactScore>,
    pub top_winners: Vec<ImpactScore>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn count_values<'a>(values: impl Iterator<Item = &'a str>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for value in values {
        *counts.entry(value.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Counts keys, returning them by descending count. Ties keep key order.
fn ranked<K: Ord + Clone + Hash>(keys: impl Iterator<Item = K>) -> Vec<(K, usize)> {
    let mut counts: HashMap<K, usize> = HashMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    let mut ranked: Vec<(K, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}

fn top_scores(scores: HashMap<String, f64>, limit: usize) -> Vec<ImpactScore> {
    let mut scores: Vec<ImpactScore> = scores
        .into_iter()
        .map(|(name, score)| ImpactScore { name, score })
        .collect();
    scores.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
    scores.truncate(limit);
    scores
}

pub fn basic_stats(tables: &AwardTables) -> BasicStats {
    let years = tables.awards.iter().filter_map(|a| a.year);
    BasicStats {
        total_awards: tables.awards.len(),
        total_projects: tables.projects.len(),
        total_winners: tables.winners.len(),
        year_range: YearRange {
            min_year: years.clone().min(),
            max_year: years.max(),
        },
        award_types: count_values(tables.awards.iter().filter_map(|a| present(&a.award_type))),
        award_levels: count_values(tables.awards.iter().filter_map(|a| present(&a.award_level))),
    }
}

/// Awards per year with their level distribution. Awards without a year are
/// left out; `award_count` counts every other award of the year, typed or not.
pub fn yearly_stats(tables: &AwardTables) -> Vec<YearlyStat> {
    let mut by_year: BTreeMap<i32, YearlyStat> = BTreeMap::new();
    for award in &tables.awards {
        let Some(year) = award.year else { continue };
        let stat = by_year.entry(year).or_insert_with(|| YearlyStat {
            year,
            ..Default::default()
        });
        stat.award_count += 1;
        if let Some(level) = present(&award.award_level) {
            *stat.level_distribution.entry(level.to_string()).or_insert(0) += 1;
        }
    }
    by_year.into_values().collect()
}

/// Awards per type with their level distribution. `count` covers every award
/// of the type, including those without a year.
pub fn type_stats(tables: &AwardTables) -> Vec<TypeStat> {
    let mut by_type: BTreeMap<&str, TypeStat> = BTreeMap::new();
    for award in &tables.awards {
        let Some(award_type) = present(&award.award_type) else { continue };
        let stat = by_type.entry(award_type).or_insert_with(|| TypeStat {
            award_type: award_type.to_string(),
            ..Default::default()
        });
        stat.count += 1;
        if let Some(level) = present(&award.award_level) {
            *stat.level_distribution.entry(level.to_string()).or_insert(0) += 1;
        }
    }
    by_type.into_values().collect()
}

/// Organizations ranked by how often they appear on projects and winners.
pub fn organization_stats(tables: &AwardTables, top_n: usize) -> Vec<OrganizationStat> {
    let organizations = tables
        .projects
        .iter()
        .filter_map(|p| present(&p.organization))
        .chain(tables.winners.iter().filter_map(|w| present(&w.organization)));

    ranked(organizations)
        .into_iter()
        .take(top_n)
        .map(|(organization, count)| OrganizationStat {
            organization: organization.to_string(),
            count,
        })
        .collect()
}

pub fn winner_stats(tables: &AwardTables, top_n: usize) -> Vec<WinnerStat> {
    let mut latest: HashMap<&str, Option<&String>> = HashMap::new();
    for winner in &tables.winners {
        latest.insert(winner.name.as_str(), winner.organization.as_ref());
    }

    ranked(tables.winners.iter().map(|w| w.name.as_str()))
        .into_iter()
        .take(top_n)
        .map(|(name, count)| WinnerStat {
            name: name.to_string(),
            count,
            latest_organization: latest.get(name).copied().flatten().cloned(),
        })
        .collect()
}

pub fn trend_analysis(tables: &AwardTables) -> TrendAnalysis {
    let mut trends = TrendAnalysis::default();
    for award in &tables.awards {
        let Some(year) = award.year else { continue };
        *trends.yearly_counts.entry(year).or_insert(0) += 1;
        if let Some(award_type) = present(&award.award_type) {
            *trends
                .type_trends
                .entry(year)
                .or_default()
                .entry(award_type.to_string())
                .or_insert(0) += 1;
        }
        if let Some(level) = present(&award.award_level) {
            *trends
                .level_trends
                .entry(year)
                .or_default()
                .entry(level.to_string())
                .or_insert(0) += 1;
        }
    }
    trends
}

/// Region counts keyed by the first two characters of each organization.
pub fn regional_analysis(tables: &AwardTables) -> Vec<RegionStat> {
    let regions = tables
        .projects
        .iter()
        .map(|p| &p.organization)
        .chain(tables.winners.iter().map(|w| &w.organization))
        .map(|org| match present(org) {
            Some(org) => org.chars().take(2).collect::<String>(),
            None => UNKNOWN_REGION.to_string(),
        });

    ranked(regions)
        .into_iter()
        .map(|(region, count)| RegionStat { region, count })
        .collect()
}

pub fn collaboration_analysis(tables: &AwardTables) -> CollaborationAnalysis {
    let mut analysis = CollaborationAnalysis::default();

    let mut project_orgs: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for project in &tables.projects {
        let orgs = project_orgs.entry(project.name.as_str()).or_default();
        if let Some(org) = present(&project.organization) {
            orgs.insert(org);
        }
    }
    for orgs in project_orgs.values() {
        match orgs.len() {
            0 => {}
            1 => analysis.single_org += 1,
            _ => analysis.multi_org += 1,
        }
        analysis.max_orgs = analysis.max_orgs.max(orgs.len());
    }

    let mut winner_orgs: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for winner in &tables.winners {
        if let Some(org) = present(&winner.organization) {
            winner_orgs
                .entry(winner.project_name.as_str())
                .or_default()
                .insert(org);
        }
    }
    let pairs = winner_orgs.values().flat_map(|orgs| {
        let orgs: Vec<&str> = orgs.iter().copied().collect();
        let mut pairs = Vec::new();
        for i in 0..orgs.len() {
            for j in i + 1..orgs.len() {
                pairs.push((orgs[i], orgs[j]));
            }
        }
        pairs
    });

    analysis.top_collaborations = ranked(pairs)
        .into_iter()
        .take(TOP_COLLABORATIONS)
        .map(|((a, b), count)| Collaboration {
            organizations: vec![a.to_string(), b.to_string()],
            count,
        })
        .collect();
    analysis
}

/// Most frequent whitespace-separated terms of two or more characters in
/// project names.
pub fn field_analysis(tables: &AwardTables) -> Vec<KeywordStat> {
    let words = tables
        .projects
        .iter()
        .flat_map(|p| p.name.split_whitespace())
        .filter(|w| w.chars().count() >= 2);

    ranked(words)
        .into_iter()
        .take(TOP_KEYWORDS)
        .map(|(keyword, count)| KeywordStat {
            keyword: keyword.to_string(),
            count,
        })
        .collect()
}

/// Organizations and winners ranked by summed award-level weights.
pub fn impact_analysis(tables: &AwardTables) -> ImpactAnalysis {
    let mut org_scores: HashMap<String, f64> = HashMap::new();
    for project in &tables.projects {
        if let (Some(org), Some(level)) = (present(&project.organization), present(&project.level)) {
            *org_scores.entry(org.to_string()).or_insert(0.0) += level_weight(Some(level));
        }
    }

    let mut project_levels: HashMap<&str, Option<&str>> = HashMap::new();
    for project in &tables.projects {
        project_levels
            .entry(project.name.as_str())
            .or_insert_with(|| present(&project.level));
    }

    let mut winner_scores: HashMap<String, f64> = HashMap::new();
    for winner in &tables.winners {
        if winner.name.is_empty() || winner.project_name.is_empty() {
            continue;
        }
        let level = project_levels
            .get(winner.project_name.as_str())
            .copied()
            .flatten();
        *winner_scores.entry(winner.name.clone()).or_insert(0.0) += level_weight(level);
    }

    ImpactAnalysis {
        top_organizations: top_scores(org_scores, TOP_IMPACT),
        top_winners: top_scores(winner_scores, TOP_IMPACT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::{AwardRow, ProjectRow, WinnerRow};

    fn award(title: &str, year: Option<i32>, ty: Option<&str>, level: Option<&str>) -> AwardRow {
        AwardRow {
            title: title.into(),
            year,
            award_type: ty.map(Into::into),
            award_level: level.map(Into::into),
            ..Default::default()
        }
    }

    fn project(name: &str, org: Option<&str>, level: Option<&str>) -> ProjectRow {
        ProjectRow {
            award_title: "A".into(),
            year: Some(2022),
            name: name.into(),
            organization: org.map(Into::into),
            level: level.map(Into::into),
        }
    }

    fn winner(project: &str, name: &str, org: Option<&str>) -> WinnerRow {
        WinnerRow {
            project_name: project.into(),
            name: name.into(),
            organization: org.map(Into::into),
        }
    }

    fn tables() -> AwardTables {
        AwardTables {
            awards: vec![
                award("A", Some(2022), Some("科技进步奖"), Some("一等奖")),
                award("B", Some(2022), Some("科技进步奖"), Some("二等奖")),
                award("C", Some(2020), Some("自然科学奖"), None),
                award("D", None, Some("自然科学奖"), Some("一等奖")),
            ],
            projects: vec![
                project("智能 电网 调度", Some("清华大学"), Some("一等奖")),
                project("智能 制造", Some("浙江大学"), Some("特等奖")),
                project("智能 制造", Some("中南大学"), None),
                project("x", None, None),
            ],
            winners: vec![
                winner("智能 电网 调度", "张三", Some("清华大学")),
                winner("智能 电网 调度", "李四", Some("北京大学")),
                winner("智能 制造", "张三", Some("浙江大学")),
                winner("智能 制造", "王五", None),
            ],
        }
    }

    #[test]
    fn test_basic_stats() {
        let stats = basic_stats(&tables());
        assert_eq!(stats.total_awards, 4);
        assert_eq!(stats.total_projects, 4);
        assert_eq!(stats.total_winners, 4);
        assert_eq!(stats.year_range, YearRange { min_year: Some(2020), max_year: Some(2022) });
        assert_eq!(stats.award_types["自然科学奖"], 2);
        assert_eq!(stats.award_levels["一等奖"], 2);
    }

    #[test]
    fn test_basic_stats_empty() {
        let stats = basic_stats(&AwardTables::default());
        assert_eq!(stats.total_awards, 0);
        assert_eq!(stats.year_range, YearRange::default());
    }

    #[test]
    fn test_yearly_and_type_stats() {
        let yearly = yearly_stats(&tables());
        assert_eq!(yearly.len(), 2);
        assert_eq!(yearly[0].year, 2020);
        assert_eq!(yearly[1].award_count, 2);
        assert_eq!(yearly[1].level_distribution["二等奖"], 1);

        let types = type_stats(&tables());
        assert_eq!(types.len(), 2);
        let natural = types.iter().find(|t| t.award_type == "自然科学奖").unwrap();
        assert_eq!(natural.count, 2);
        assert_eq!(natural.level_distribution.len(), 1);
    }

    #[test]
    fn test_yearly_stats_count_untyped_awards() {
        let tables = AwardTables {
            awards: vec![
                award("A", Some(2021), Some("技术发明奖"), None),
                award("B", Some(2021), None, Some("二等奖")),
                award("C", None, Some("技术发明奖"), None),
            ],
            ..Default::default()
        };
        let yearly = yearly_stats(&tables);
        assert_eq!(yearly.len(), 1);
        assert_eq!(yearly[0].award_count, 2);

        let types = type_stats(&tables);
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].count, 2);
    }

    #[test]
    fn test_organization_stats() {
        let orgs = organization_stats(&tables(), 2);
        assert_eq!(orgs.len(), 2);
        assert_eq!(orgs[0].count, 2);
        assert_eq!(orgs[1].count, 2);
        let names: Vec<&str> = orgs.iter().map(|o| o.organization.as_str()).collect();
        assert!(names.contains(&"清华大学"));
        assert!(names.contains(&"浙江大学"));
    }

    #[test]
    fn test_winner_stats() {
        let winners = winner_stats(&tables(), 10);
        assert_eq!(winners[0].name, "张三");
        assert_eq!(winners[0].count, 2);
        assert_eq!(winners[0].latest_organization.as_deref(), Some("浙江大学"));
        let wang = winners.iter().find(|w| w.name == "王五").unwrap();
        assert_eq!(wang.latest_organization, None);
    }

    #[test]
    fn test_trend_analysis() {
        let trends = trend_analysis(&tables());
        assert_eq!(trends.yearly_counts[&2022], 2);
        assert_eq!(trends.type_trends[&2022]["科技进步奖"], 2);
        assert_eq!(trends.level_trends[&2022].len(), 2);
        assert!(!trends.level_trends.contains_key(&2020));
    }

    #[test]
    fn test_regional_analysis() {
        let regions = regional_analysis(&tables());
        let unknown = regions.iter().find(|r| r.region == UNKNOWN_REGION).unwrap();
        assert_eq!(unknown.count, 2);
        let qinghua = regions.iter().find(|r| r.region == "清华").unwrap();
        assert_eq!(qinghua.count, 2);
        assert_eq!(regions.iter().map(|r| r.count).sum::<usize>(), 8);
    }

    #[test]
    fn test_collaboration_analysis() {
        let analysis = collaboration_analysis(&tables());
        assert_eq!(analysis.single_org, 1);
        assert_eq!(analysis.multi_org, 1);
        assert_eq!(analysis.max_orgs, 2);
        assert_eq!(analysis.top_collaborations.len(), 1);
        assert_eq!(analysis.top_collaborations[0].organizations, vec!["北京大学", "清华大学"]);
        assert_eq!(analysis.top_collaborations[0].count, 1);
    }

    #[test]
    fn test_field_analysis() {
        let keywords = field_analysis(&tables());
        assert_eq!(keywords[0].keyword, "智能");
        assert_eq!(keywords[0].count, 3);
        assert_eq!(keywords[1].keyword, "制造");
        assert!(keywords.iter().all(|k| k.keyword != "x"));
    }

    #[test]
    fn test_impact_analysis() {
        let impact = impact_analysis(&tables());
        assert_eq!(impact.top_organizations[0].name, "浙江大学");
        assert_eq!(impact.top_organizations[0].score, 5.0);
        assert_eq!(impact.top_organizations.len(), 2);

        // 张三: 一等奖 (4) + 特等奖 (5)
        assert_eq!(impact.top_winners[0].name, "张三");
        assert_eq!(impact.top_winners[0].score, 9.0);
    }
}
