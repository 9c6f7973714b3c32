use crate::error::TimelineResult;
use crate::model::Portfolio;
use std::path::Path;

/// Save a portfolio to a JSON file.
pub fn save_portfolio(portfolio: &Portfolio, path: &Path) -> TimelineResult<()> {
    let json = serde_json::to_string_pretty(portfolio)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Load a portfolio from a JSON file. Entities are normalized on the way in.
pub fn load_portfolio(path: &Path) -> TimelineResult<Portfolio> {
    let json = std::fs::read_to_string(path)?;
    let mut portfolio: Portfolio = serde_json::from_str(&json)?;
    let corrected = portfolio.normalize();
    tracing::info!(
        path = %path.display(),
        projects = portfolio.projects.len(),
        corrected,
        "portfolio loaded"
    );
    Ok(portfolio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityId, TimelineEntity};
    use chrono::NaiveDate;

    #[test]
    fn saved_portfolio_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q1.portfolio.json");
        let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day);

        let mut portfolio = Portfolio::new("Q1");
        portfolio
            .projects
            .push(TimelineEntity::new("p1", "Website", d(1, 8), d(3, 29)).with_progress(40));
        portfolio.tasks.insert(
            "p1".into(),
            vec![TimelineEntity::new_milestone("m1", "Beta", NaiveDate::from_ymd_opt(2024, 2, 15).unwrap())],
        );
        save_portfolio(&portfolio, &path).unwrap();

        let loaded = load_portfolio(&path).unwrap();
        assert_eq!(loaded.name, "Q1");
        assert_eq!(loaded.projects, portfolio.projects);
        assert!(loaded.tasks[&EntityId::from("p1")][0].is_milestone());
    }

    #[test]
    fn load_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "[1, 2").unwrap();
        assert!(load_portfolio(&path).is_err());
    }
}
