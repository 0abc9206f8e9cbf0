//! `frostgate classify` and `frostgate gate`.

use anyhow::Result;
use frostgate_core::FrostgateConfig;
use frostgate_sql::{PermissionGate, PermissionTable, StatementClassifier};

pub fn classify(config: &FrostgateConfig, sql: &str) {
    let classifier = StatementClassifier::new(config.sql.dialect);
    for (index, kind) in classifier.classify_all(sql).iter().enumerate() {
        println!("{}: {}", index, kind);
    }
}

/// Print the decision for each statement. Fails when any is denied.
pub fn gate(config: &FrostgateConfig, sql: &str) -> Result<()> {
    let table = PermissionTable::from_config(&config.statement_permissions)?;
    let gate = PermissionGate::new(StatementClassifier::new(config.sql.dialect), table);

    let decisions = gate.explain(sql);
    for (index, decision) in decisions.iter().enumerate() {
        println!(
            "{}: {} {} ({})",
            index,
            decision.kind,
            if decision.allowed { "allowed" } else { "DENIED" },
            serde_json::to_value(decision.source)?
                .as_str()
                .unwrap_or_default()
        );
    }

    gate.check(sql)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_permissions_allow_queries_only() {
        let config = FrostgateConfig::default();
        assert!(gate(&config, "SELECT 1").is_ok());
        assert!(gate(&config, "SHOW WAREHOUSES").is_ok());
        assert!(gate(&config, "DELETE FROM t WHERE id=1").is_err());
        assert!(gate(&config, "SELECT 1; DROP TABLE t").is_err());
    }
}
