//! Query engine: pure functions over the issue store.
//!
//! Nothing in this module mutates its inputs. Distance annotation returns
//! fresh `Ranked` values; the views decide what to render from them.

use serde::Serialize;

use crate::types::{Coordinate, Issue, QuickStats, Statistics, Status, Urgency};

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points, by the haversine formula.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// An issue annotated with its distance from the viewer. `distance` is
/// `None` when either side lacks a coordinate.
#[derive(Debug, Clone, Serialize)]
pub struct Ranked {
    #[serde(flatten)]
    pub issue: Issue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

/// Annotates every issue with its distance from `viewer`, returning copies
/// in insertion order.
pub fn annotate_distance(issues: &[Issue], viewer: Option<Coordinate>) -> Vec<Ranked> {
    issues
        .iter()
        .map(|issue| Ranked {
            distance: match (viewer, issue.location.coordinate) {
                (Some(here), Some(there)) => Some(haversine_km(here, there)),
                _ => None,
            },
            issue: issue.clone(),
        })
        .collect()
}

/// Outcome of a query run. An empty result is a valid, non-error outcome,
/// and "no issues at all" stays distinguishable from "no issues match".
#[derive(Debug)]
pub enum QueryOutcome {
    EmptyStore,
    NoMatches,
    Matches(Vec<Ranked>),
}

impl QueryOutcome {
    pub fn matches(&self) -> &[Ranked] {
        match self {
            QueryOutcome::Matches(ranked) => ranked,
            _ => &[],
        }
    }
}

/// Filter and ordering specification for one view of the store.
///
/// Equality filters default to match-all; `search` is a case-insensitive
/// substring match across title, description, location text, reporter, and
/// category. Issues without a resolvable distance pass both radius bounds.
#[derive(Debug, Clone, Default)]
pub struct IssueQuery {
    pub status: Option<Status>,
    pub category: Option<String>,
    pub urgency: Option<Urgency>,
    pub search: Option<String>,
    pub max_km: Option<f64>,
    pub min_km: Option<f64>,
    pub sort_by_distance: bool,
}

impl IssueQuery {
    /// The "local issues" view: inside the configured ring, nearest first.
    pub fn local(min_km: f64, max_km: f64) -> Self {
        IssueQuery {
            min_km: Some(min_km),
            max_km: Some(max_km),
            sort_by_distance: true,
            ..IssueQuery::default()
        }
    }

    fn matches(&self, ranked: &Ranked) -> bool {
        let issue = &ranked.issue;

        if let Some(max) = self.max_km {
            if ranked.distance.is_some_and(|d| d > max) {
                return false;
            }
        }
        if let Some(min) = self.min_km {
            if ranked.distance.is_some_and(|d| d < min) {
                return false;
            }
        }
        if self.status.is_some_and(|s| s != issue.status) {
            return false;
        }
        if self
            .urgency
            .is_some_and(|u| u != issue.urgency)
        {
            return false;
        }
        if let Some(category) = &self.category {
            if !issue.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(needle) = &self.search {
            let needle = needle.to_lowercase();
            let hit = [
                &issue.title,
                &issue.description,
                &issue.location.text,
                &issue.reporter,
                &issue.category,
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        true
    }
}

/// Runs a query: distance annotation, radius bounds, equality filters,
/// search, then the optional distance sort. Insertion order is preserved
/// everywhere the sort does not apply.
pub fn run(issues: &[Issue], viewer: Option<Coordinate>, query: &IssueQuery) -> QueryOutcome {
    if issues.is_empty() {
        return QueryOutcome::EmptyStore;
    }

    let mut ranked: Vec<Ranked> = annotate_distance(issues, viewer)
        .into_iter()
        .filter(|r| query.matches(r))
        .collect();

    if ranked.is_empty() {
        return QueryOutcome::NoMatches;
    }

    if query.sort_by_distance {
        sort_by_distance(&mut ranked);
    }

    QueryOutcome::Matches(ranked)
}

/// Stable distance-ascending sort; entries without a distance follow the
/// ranked ones in their insertion order.
pub fn sort_by_distance(ranked: &mut [Ranked]) {
    ranked.sort_by(|a, b| match (a.distance, b.distance) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

/// Counters for the home view's quick-stat tiles.
pub fn quick_stats(ranked: &[Ranked]) -> QuickStats {
    QuickStats {
        local_issues: ranked.len(),
        urgent: ranked
            .iter()
            .filter(|r| r.issue.urgency >= Urgency::High)
            .count(),
        resolved: ranked
            .iter()
            .filter(|r| r.issue.status == Status::Resolved)
            .count(),
    }
}

/// Counters for the admin dashboard header.
pub fn admin_stats(issues: &[Issue]) -> Statistics {
    Statistics {
        total_issues: issues.len(),
        reported: count_status(issues, Status::Reported),
        under_review: count_status(issues, Status::UnderReview),
        in_progress: count_status(issues, Status::InProgress),
        resolved: count_status(issues, Status::Resolved),
    }
}

fn count_status(issues: &[Issue], status: Status) -> usize {
    issues.iter().filter(|i| i.status == status).count()
}

/// Unresolved issues in the same category, excluding the issue itself.
/// At most three, in insertion order.
pub fn similar_issues<'a>(issues: &'a [Issue], to: &Issue) -> Vec<&'a Issue> {
    issues
        .iter()
        .filter(|i| i.id != to.id && i.category == to.category && i.status != Status::Resolved)
        .take(3)
        .collect()
}

/// Issues resolved within the trailing `days` window.
pub fn resolved_within_days(issues: &[Issue], days: i64, now: chrono::DateTime<chrono::Utc>) -> usize {
    let cutoff = now - chrono::Duration::days(days);
    issues
        .iter()
        .filter(|i| i.status == Status::Resolved && i.resolved_date.unwrap_or(i.date) > cutoff)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Site;
    use chrono::Utc;

    fn issue_at(id: &str, coordinate: Option<Coordinate>) -> Issue {
        Issue {
            id: id.to_string(),
            title: format!("Issue {id}"),
            description: String::new(),
            category: "Road".to_string(),
            location: Site::new("somewhere", coordinate),
            specific_location: None,
            status: Status::Reported,
            urgency: Urgency::Low,
            upvotes: 0,
            flags: 0,
            reporter: "Anonymous".to_string(),
            reporter_id: None,
            date: Utc::now(),
            resolved_date: None,
            first_observed: None,
            recurring: None,
            safety_hazard: false,
            images: Vec::new(),
            video_url: None,
            contact: None,
        }
    }

    const ORIGIN: Coordinate = Coordinate { lat: 0.0, lng: 0.0 };

    #[test]
    fn haversine_one_degree_of_longitude_at_equator() {
        let km = haversine_km(ORIGIN, Coordinate { lat: 0.0, lng: 1.0 });
        assert!((km - 111.19).abs() < 0.1, "got {km}");
    }

    #[test]
    fn distance_filter_includes_at_radius_and_excludes_below() {
        // ~19.9 km east of the origin
        let issues = vec![issue_at("a", Some(Coordinate { lat: 0.0, lng: 0.179 }))];

        let at_20 = run(
            &issues,
            Some(ORIGIN),
            &IssueQuery {
                max_km: Some(20.0),
                ..IssueQuery::default()
            },
        );
        assert_eq!(at_20.matches().len(), 1);

        let at_19 = run(
            &issues,
            Some(ORIGIN),
            &IssueQuery {
                max_km: Some(19.0),
                ..IssueQuery::default()
            },
        );
        assert!(matches!(at_19, QueryOutcome::NoMatches));
    }

    #[test]
    fn issues_without_coordinates_pass_both_radius_bounds() {
        let issues = vec![issue_at("a", None)];
        let outcome = run(
            &issues,
            Some(ORIGIN),
            &IssueQuery {
                min_km: Some(5.0),
                max_km: Some(20.0),
                ..IssueQuery::default()
            },
        );
        assert_eq!(outcome.matches().len(), 1);
        assert!(outcome.matches()[0].distance.is_none());
    }

    #[test]
    fn annotate_does_not_mutate_inputs() {
        let issues = vec![issue_at("a", Some(Coordinate { lat: 0.0, lng: 1.0 }))];
        let before = serde_json::to_string(&issues).unwrap();
        let _ = annotate_distance(&issues, Some(ORIGIN));
        assert_eq!(serde_json::to_string(&issues).unwrap(), before);
    }

    #[test]
    fn filter_composition_returns_exact_subset() {
        let mut reported = issue_at("a", None);
        reported.status = Status::Reported;
        let mut resolved = issue_at("b", None);
        resolved.status = Status::Resolved;
        resolved.resolved_date = Some(Utc::now());
        let issues = vec![reported, resolved];

        let outcome = run(
            &issues,
            None,
            &IssueQuery {
                status: Some(Status::Reported),
                ..IssueQuery::default()
            },
        );
        let matches = outcome.matches();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].issue.id, "a");
    }

    #[test]
    fn empty_store_and_no_matches_are_distinct() {
        let query = IssueQuery {
            status: Some(Status::Resolved),
            ..IssueQuery::default()
        };

        assert!(matches!(run(&[], None, &query), QueryOutcome::EmptyStore));

        let issues = vec![issue_at("a", None)];
        assert!(matches!(
            run(&issues, None, &query),
            QueryOutcome::NoMatches
        ));
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let mut issue = issue_at("a", None);
        issue.title = "Broken Streetlight near Central Park".to_string();
        let issues = vec![issue, issue_at("b", None)];

        let outcome = run(
            &issues,
            None,
            &IssueQuery {
                search: Some("STREETLIGHT".to_string()),
                ..IssueQuery::default()
            },
        );
        assert_eq!(outcome.matches().len(), 1);

        let by_reporter = run(
            &issues,
            None,
            &IssueQuery {
                search: Some("anonymous".to_string()),
                ..IssueQuery::default()
            },
        );
        assert_eq!(by_reporter.matches().len(), 2);
    }

    #[test]
    fn distance_sort_is_ascending_with_unranked_last() {
        let issues = vec![
            issue_at("far", Some(Coordinate { lat: 0.0, lng: 0.5 })),
            issue_at("unranked", None),
            issue_at("near", Some(Coordinate { lat: 0.0, lng: 0.1 })),
        ];

        let outcome = run(
            &issues,
            Some(ORIGIN),
            &IssueQuery {
                sort_by_distance: true,
                ..IssueQuery::default()
            },
        );
        let ids: Vec<&str> = outcome
            .matches()
            .iter()
            .map(|r| r.issue.id.as_str())
            .collect();
        assert_eq!(ids, vec!["near", "far", "unranked"]);
    }

    #[test]
    fn insertion_order_preserved_without_sort() {
        let issues = vec![
            issue_at("c", Some(Coordinate { lat: 0.0, lng: 0.5 })),
            issue_at("a", Some(Coordinate { lat: 0.0, lng: 0.1 })),
            issue_at("b", None),
        ];
        let outcome = run(&issues, Some(ORIGIN), &IssueQuery::default());
        let ids: Vec<&str> = outcome
            .matches()
            .iter()
            .map(|r| r.issue.id.as_str())
            .collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn quick_stats_count_urgent_and_resolved() {
        let mut critical = issue_at("a", None);
        critical.urgency = Urgency::Critical;
        let mut resolved = issue_at("b", None);
        resolved.status = Status::Resolved;
        resolved.resolved_date = Some(Utc::now());
        let ranked = annotate_distance(&[critical, resolved, issue_at("c", None)], None);

        let stats = quick_stats(&ranked);
        assert_eq!(stats.local_issues, 3);
        assert_eq!(stats.urgent, 1);
        assert_eq!(stats.resolved, 1);
    }

    #[test]
    fn similar_issues_same_category_unresolved_capped() {
        let target = issue_at("t", None);
        let mut pool: Vec<Issue> = (0..5)
            .map(|i| issue_at(&format!("p{i}"), None))
            .collect();
        pool[1].status = Status::Resolved;
        pool[1].resolved_date = Some(Utc::now());
        pool.push(target.clone());

        let similar = similar_issues(&pool, &target);
        assert_eq!(similar.len(), 3);
        assert!(similar.iter().all(|i| i.id != "t" && i.id != "p1"));
    }
}
