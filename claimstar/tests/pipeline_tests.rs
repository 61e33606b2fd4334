use anyhow::{Context, Result};
use assert_cmd::prelude::*;
use duckdb::Connection;
use predicates::prelude::*;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// A private copy of the healthcare fixture project.
struct ClaimstarTestEnv {
    _tmp: TempDir,
    root: PathBuf,
}

impl ClaimstarTestEnv {
    fn new() -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let project_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .context("Workspace root not found")?
            .join("fixtures/healthcare");

        let dest = tmp.path().join("healthcare");
        Self::copy_dir(&project_root, &dest)?;

        Ok(Self {
            _tmp: tmp,
            root: dest,
        })
    }

    fn copy_dir(src: &PathBuf, dst: &PathBuf) -> std::io::Result<()> {
        let mut options = fs_extra::dir::CopyOptions::new();
        options.skip_exist = true;
        options.content_only = true;

        std::fs::create_dir_all(dst)?;
        fs_extra::dir::copy(src, dst, &options)
            .map(|_| ())
            .map_err(|e| std::io::Error::other(e.to_string()))
    }

    fn claimstar(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("claimstar"));
        cmd.current_dir(&self.root);
        cmd.env_remove("CLAIMSTAR_DATABASE");
        cmd.env_remove("CLAIMSTAR_TARGET_PATH");
        cmd
    }

    fn db(&self) -> Result<Connection> {
        Ok(Connection::open(self.root.join("target/warehouse.duckdb"))?)
    }

    fn built(&self) -> Result<Connection> {
        self.claimstar().arg("run").assert().success();
        self.db()
    }
}

fn scalar(conn: &Connection, sql: &str) -> Result<i64> {
    Ok(conn.query_row(sql, [], |row| row.get(0))?)
}

fn text(conn: &Connection, sql: &str) -> Result<Option<String>> {
    Ok(conn.query_row(sql, [], |row| row.get(0))?)
}

#[test]
fn test_run_builds_every_layer_and_reports() -> Result<()> {
    let env = ClaimstarTestEnv::new()?;

    env.claimstar()
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("gold_fact_claim_transactions"));

    let report = std::fs::read_to_string(env.root.join("target/run_results.json"))?;
    let report: serde_json::Value = serde_json::from_str(&report)?;
    assert_eq!(report["success"], true);
    assert_eq!(report["tables"].as_array().map(Vec::len), Some(20));
    assert_eq!(report["tables"][0]["stage"], "bronze");

    let conn = env.db()?;
    assert_eq!(scalar(&conn, "SELECT COUNT(*) FROM bronze_patients")?, 7);
    assert_eq!(scalar(&conn, "SELECT COUNT(*) FROM silver_dim_patient")?, 5);
    assert_eq!(scalar(&conn, "SELECT COUNT(*) FROM gold_dim_patient")?, 6);
    Ok(())
}

#[test]
fn test_every_gold_dimension_has_one_unknown_member() -> Result<()> {
    let env = ClaimstarTestEnv::new()?;
    let conn = env.built()?;

    for (table, key, natural_key, sentinel) in [
        ("gold_dim_patient", "patient_sk", "patient_natural_key", "UNKNOWN"),
        ("gold_dim_provider", "provider_sk", "provider_natural_key", "UNKNOWN"),
        ("gold_dim_payer", "payer_sk", "payer_natural_key", "UNKNOWN"),
        ("gold_dim_procedure", "procedure_sk", "procedure_code", "UNKNOWN"),
        ("gold_dim_encounter_type", "encounter_type_sk", "encounter_type", "UNKNOWN"),
        ("gold_dim_date", "date_sk", "date_key", "9999-12-31"),
    ] {
        let members = scalar(
            &conn,
            &format!("SELECT COUNT(*) FROM {table} WHERE {key} = -1 AND {natural_key} = '{sentinel}'"),
        )?;
        assert_eq!(members, 1, "{table}");
        let keys = scalar(
            &conn,
            &format!("SELECT COUNT(*) - COUNT(DISTINCT {key}) FROM {table}"),
        )?;
        assert_eq!(keys, 0, "{table} keys are unique");
    }

    let unknown_patient = text(
        &conn,
        "SELECT full_name || '/' || age_group FROM gold_dim_patient WHERE patient_sk = -1",
    )?;
    assert_eq!(unknown_patient.as_deref(), Some("Unknown Patient/Unknown"));
    Ok(())
}

#[test]
fn test_fact_keys_always_resolve() -> Result<()> {
    let env = ClaimstarTestEnv::new()?;
    let conn = env.built()?;

    for (fact, column, dim, key) in [
        ("gold_fact_claims", "patient_sk", "gold_dim_patient", "patient_sk"),
        ("gold_fact_claims", "provider_sk", "gold_dim_provider", "provider_sk"),
        ("gold_fact_claims", "claim_start_date_sk", "gold_dim_date", "date_sk"),
        ("gold_fact_claims", "claim_end_date_sk", "gold_dim_date", "date_sk"),
        ("gold_fact_encounters", "payer_sk", "gold_dim_payer", "payer_sk"),
        ("gold_fact_encounters", "encounter_type_sk", "gold_dim_encounter_type", "encounter_type_sk"),
        ("gold_fact_encounters", "discharge_date_sk", "gold_dim_date", "date_sk"),
        ("gold_fact_claim_transactions", "procedure_sk", "gold_dim_procedure", "procedure_sk"),
        ("gold_fact_claim_transactions", "transaction_date_sk", "gold_dim_date", "date_sk"),
    ] {
        let orphans = scalar(
            &conn,
            &format!(
                "SELECT COUNT(*) FROM {fact} f LEFT JOIN {dim} d ON f.{column} = d.{key} WHERE d.{key} IS NULL"
            ),
        )?;
        assert_eq!(orphans, 0, "{fact}.{column}");
    }

    // P999 / PR03 are never conformed; the transaction falls back to -1 everywhere.
    let t004 = text(
        &conn,
        "SELECT concat_ws(',', patient_sk, provider_sk, transaction_date_sk, transaction_amount) \
         FROM gold_fact_claim_transactions WHERE transaction_id = 'T004'",
    )?;
    assert_eq!(t004.as_deref(), Some("-1,-1,-1,0.00"));
    Ok(())
}

#[test]
fn test_surrogate_keys_are_dense_in_first_seen_order() -> Result<()> {
    let env = ClaimstarTestEnv::new()?;
    let conn = env.built()?;

    let keys = text(
        &conn,
        "SELECT string_agg(concat(patient_id, '=', patient_sk), ' ' ORDER BY patient_sk) FROM silver_dim_patient",
    )?;
    assert_eq!(keys.as_deref(), Some("P001=1 P002=2 P003=3 P004=4 P005=5"));

    let first_name = text(&conn, "SELECT full_name FROM silver_dim_patient WHERE patient_id = 'P001'")?;
    assert_eq!(first_name.as_deref(), Some("John Smith"), "the duplicate row is dropped");

    let providers = text(
        &conn,
        "SELECT string_agg(provider_id, ',' ORDER BY provider_sk) FROM silver_dim_provider",
    )?;
    assert_eq!(providers.as_deref(), Some("PR01,PR02,PR04"));
    Ok(())
}

#[test]
fn test_age_respects_the_birthday() -> Result<()> {
    let env = ClaimstarTestEnv::new()?;
    let conn = env.built()?;

    let ages = text(
        &conn,
        "SELECT string_agg(patient_natural_key || ':' || COALESCE(CAST(age AS VARCHAR), '-') || ':' || age_group, ' ' ORDER BY patient_sk) \
         FROM gold_dim_patient WHERE patient_sk > 0",
    )?;
    // as-of 2024-02-28: P002 turns 24 on March 1st, P003 turns 13 that day.
    assert_eq!(
        ages.as_deref(),
        Some("P001:43:36-45 P002:23:18-25 P003:13:13-17 P004:-:Unknown P005:84:75+")
    );
    Ok(())
}

#[test]
fn test_inverted_dates_are_dropped() -> Result<()> {
    let env = ClaimstarTestEnv::new()?;
    let conn = env.built()?;

    let silver_end = scalar(
        &conn,
        "SELECT COUNT(*) FROM silver_fact_claim WHERE claim_id = 'C002' AND claim_end_date IS NULL",
    )?;
    assert_eq!(silver_end, 1);
    let gold_end = scalar(
        &conn,
        "SELECT claim_end_date_sk FROM gold_fact_claims WHERE claim_id = 'C002'",
    )?;
    assert_eq!(gold_end, -1);

    let stays = text(
        &conn,
        "SELECT string_agg(encounter_id || ':' || COALESCE(CAST(length_of_stay_days AS VARCHAR), '-') || ':' || CAST(discharge_date_sk AS VARCHAR), ' ' ORDER BY encounter_id) \
         FROM gold_fact_encounters",
    )?;
    let stays = stays.unwrap_or_default();
    assert!(stays.starts_with("E001:2:"), "{stays}");
    assert!(stays.contains("E002:0:-1"), "{stays}");
    assert!(stays.contains("E003:-:-1"), "{stays}");
    Ok(())
}

#[test]
fn test_calendar_spans_observed_fact_dates() -> Result<()> {
    let env = ClaimstarTestEnv::new()?;
    let conn = env.built()?;

    let bounds = text(
        &conn,
        "SELECT MIN(date_key) || '..' || MAX(date_key) FROM gold_dim_date WHERE date_sk > 0",
    )?;
    assert_eq!(bounds.as_deref(), Some("2024-01-05..2024-06-10"));
    assert_eq!(scalar(&conn, "SELECT COUNT(*) FROM gold_dim_date")?, 159);
    assert_eq!(
        scalar(&conn, "SELECT date_sk FROM gold_dim_date WHERE date_key = '2024-01-05'")?,
        1
    );
    Ok(())
}

/// Facts joined back to their dimensions' natural keys, with every measure,
/// ordered by natural key. Surrogate values never appear.
const NATURAL_KEY_VIEWS: [&str; 4] = [
    "SELECT string_agg(concat_ws('|', patient_natural_key, full_name, date_of_birth, age, age_group), ' ' \
     ORDER BY patient_natural_key) FROM gold_dim_patient",
    "SELECT string_agg(concat_ws('|', f.claim_id, p.patient_natural_key, pr.provider_natural_key, \
     s.date_key, e.date_key, f.total_outstanding), ' ' ORDER BY f.claim_id) \
     FROM gold_fact_claims f \
     JOIN gold_dim_patient p ON p.patient_sk = f.patient_sk \
     JOIN gold_dim_provider pr ON pr.provider_sk = f.provider_sk \
     JOIN gold_dim_date s ON s.date_sk = f.claim_start_date_sk \
     JOIN gold_dim_date e ON e.date_sk = f.claim_end_date_sk",
    "SELECT string_agg(concat_ws('|', f.encounter_id, p.patient_natural_key, pr.provider_natural_key, \
     py.payer_natural_key, t.encounter_type, s.date_key, e.date_key, f.total_claim_cost, \
     f.payer_coverage, f.length_of_stay_days), ' ' ORDER BY f.encounter_id) \
     FROM gold_fact_encounters f \
     JOIN gold_dim_patient p ON p.patient_sk = f.patient_sk \
     JOIN gold_dim_provider pr ON pr.provider_sk = f.provider_sk \
     JOIN gold_dim_payer py ON py.payer_sk = f.payer_sk \
     JOIN gold_dim_encounter_type t ON t.encounter_type_sk = f.encounter_type_sk \
     JOIN gold_dim_date s ON s.date_sk = f.encounter_date_sk \
     JOIN gold_dim_date e ON e.date_sk = f.discharge_date_sk",
    "SELECT string_agg(concat_ws('|', f.transaction_id, f.claim_id, p.patient_natural_key, \
     pr.provider_natural_key, d.date_key, c.procedure_code, f.transaction_amount), ' ' \
     ORDER BY f.transaction_id) \
     FROM gold_fact_claim_transactions f \
     JOIN gold_dim_patient p ON p.patient_sk = f.patient_sk \
     JOIN gold_dim_provider pr ON pr.provider_sk = f.provider_sk \
     JOIN gold_dim_date d ON d.date_sk = f.transaction_date_sk \
     JOIN gold_dim_procedure c ON c.procedure_sk = f.procedure_sk",
];

fn natural_key_snapshot(conn: &Connection) -> Result<Vec<Option<String>>> {
    NATURAL_KEY_VIEWS.iter().map(|sql| text(conn, sql)).collect()
}

#[test]
fn test_rerun_is_idempotent() -> Result<()> {
    let env = ClaimstarTestEnv::new()?;

    let first = natural_key_snapshot(&env.built()?)?;
    let second = natural_key_snapshot(&env.built()?)?;
    assert_eq!(first, second);

    let transactions = first[3].as_deref().unwrap_or_default();
    assert!(transactions.starts_with("T001|C001|P001|PR01|2024-01-05|99213|120.50"));
    assert!(
        transactions.contains("T004|C003|UNKNOWN|UNKNOWN|9999-12-31|"),
        "{transactions}"
    );
    assert_eq!(transactions.split(' ').count(), 4, "every fact survives the joins");
    Ok(())
}

#[test]
fn test_select_builds_only_upstream_tables() -> Result<()> {
    let env = ClaimstarTestEnv::new()?;

    env.claimstar()
        .args(["run", "--select", "gold_dim_payer"])
        .assert()
        .success();

    let conn = env.db()?;
    let built = text(
        &conn,
        "SELECT string_agg(table_name, ',' ORDER BY table_name) FROM information_schema.tables",
    )?;
    assert_eq!(
        built.as_deref(),
        Some("bronze_payers,gold_dim_payer,silver_dim_payer")
    );
    Ok(())
}

#[test]
fn test_missing_column_fails_the_run() -> Result<()> {
    let env = ClaimstarTestEnv::new()?;
    std::fs::write(env.root.join("data/raw/payers.csv"), "payer_id\nPAY01\n")?;

    env.claimstar()
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("payer_name"));
    Ok(())
}

#[test]
fn test_plan_inspect_and_clean() -> Result<()> {
    let env = ClaimstarTestEnv::new()?;

    env.claimstar()
        .args(["plan", "--select", "gold_fact_encounters"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gold_dim_encounter_type"))
        .stdout(predicate::str::contains("gold_fact_claims").not());

    env.claimstar().arg("run").assert().success();
    env.claimstar()
        .args(["inspect", "--table", "gold_dim_payer", "--limit", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Blue Cross"))
        .stdout(predicate::str::contains("payer_natural_key"));

    env.claimstar()
        .arg("clean")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed target"));
    assert!(!env.root.join("target").exists());
    Ok(())
}
