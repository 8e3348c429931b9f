//! End-to-end schema runs

use pretty_assertions::assert_eq;
use snowgen_core::ObjectCategory;
use snowgen_engine::{create_new_schema, EngineError, ObjectStatus, RunOptions};
use snowgen_repo::{FileStore, LocalStore, MemoryStore, ProjectLayout, TemplateRepository};
use std::fs;
use std::path::Path;

const SCHEMAS_YAML: &str = r#"
schemas:
  - name: raw_sales
    database: RAW
    role: LOADER
    schema_definition:
      - object_name: schema
        template_name: schema.sql
    file_formats:
      - object_name: CSV_FORMAT
        template_name: file_format.sql
        field_delimiter: ";"
    stages:
      - object_name: landing
        template_name: stage.sql
        prefix: int
    tables:
      - template_name: table.sql
        generate_columns_from_template: true
      - object_name: Audit
        template_name: table.sql
        columns:
          EVENT_ID: NUMBER
          "1ST_SEEN": TIMESTAMP_NTZ
  - name: curated_sales
    database: CURATED
    role: TRANSFORMER
    dynamic_tables:
      - template_name: dynamic_table.sql
        generate_columns_from_table: true
        source_database: RAW
        pattern: 'TRIM("{column_name}") AS "{column_name}"'
        suffix: dt
"#;

const SCHEMA_SQL: &str = "USE ROLE {role};\nUSE DATABASE {env}_{database};\nCREATE SCHEMA IF NOT EXISTS {schema};\n";
const FILE_FORMAT_SQL: &str = "CREATE FILE FORMAT IF NOT EXISTS {name} TYPE = CSV FIELD_DELIMITER = '{field_delimiter}';\n";
const STAGE_SQL: &str = "CREATE STAGE IF NOT EXISTS {name};\n";
const TABLE_SQL: &str =
    "USE ROLE {role};\nUSE DATABASE {database};\nUSE SCHEMA {schema};\n\nCREATE OR REPLACE TABLE {name} (\n    {table_columns}\n);\n";
const DYNAMIC_SQL: &str = "CREATE OR REPLACE DYNAMIC TABLE {name}\nTARGET_LAG = '1 hour'\nAS\nSELECT\n    {formatted_transformations}\nFROM {source_database}.{source_schema}.{source_object};\n";

fn layout() -> ProjectLayout {
    ProjectLayout::new("/p/objects", "/p/templates/schemas.yaml")
        .with_sql_templates("/p/templates/sql_templates")
        .with_data_templates("/p/templates/data_templates")
}

fn store() -> MemoryStore {
    MemoryStore::new()
        .with_file("/p/templates/schemas.yaml", SCHEMAS_YAML)
        .with_file("/p/templates/sql_templates/schema.sql", SCHEMA_SQL)
        .with_file("/p/templates/sql_templates/file_format.sql", FILE_FORMAT_SQL)
        .with_file("/p/templates/sql_templates/stage.sql", STAGE_SQL)
        .with_file("/p/templates/sql_templates/table.sql", TABLE_SQL)
        .with_file("/p/templates/sql_templates/dynamic_table.sql", DYNAMIC_SQL)
        .with_file("/p/templates/data_templates/SALES/orders_2024-01-05.csv", "ORDER_ID,AMOUNT,SELECT\n1,2,3\n")
        .with_file("/p/templates/data_templates/SALES/customers_20240105.csv", "CUSTOMER_ID,NAME\n")
}

fn object(repo: &TemplateRepository<MemoryStore>, path: &str) -> String {
    repo.store()
        .file(format!("/p/objects/databases/{}", path))
        .unwrap_or_else(|| panic!("{} was not written", path))
}

#[test]
fn raw_schema_run_renders_every_category() {
    let repo = TemplateRepository::new(store(), layout());
    let report = create_new_schema(&repo, "SALES", "raw_sales", &RunOptions::default()).unwrap();

    assert!(!report.has_failures(), "{:?}", report);
    assert_eq!(report.summary.created, 6);

    let categories: Vec<_> = report.objects.iter().map(|o| o.category).collect();
    assert_eq!(
        categories,
        vec![
            ObjectCategory::SchemaDefinition,
            ObjectCategory::FileFormats,
            ObjectCategory::InternalStages,
            ObjectCategory::Tables,
            ObjectCategory::Tables,
            ObjectCategory::Tables,
        ]
    );

    assert_eq!(
        object(&repo, "RAW/schemas/SALES/schema_definition/schema.sql"),
        "USE ROLE LOADER;\nUSE DATABASE {env}_RAW;\nCREATE SCHEMA IF NOT EXISTS SALES;\n"
    );
    assert_eq!(
        object(&repo, "RAW/schemas/SALES/file_formats/csv_format.sql"),
        "CREATE FILE FORMAT IF NOT EXISTS csv_format TYPE = CSV FIELD_DELIMITER = ';';\n"
    );
    assert_eq!(
        object(&repo, "RAW/schemas/SALES/internal_stages/int_landing.sql"),
        "CREATE STAGE IF NOT EXISTS int_landing;\n"
    );
    assert_eq!(
        object(&repo, "RAW/schemas/SALES/tables/orders.sql"),
        "USE ROLE LOADER;\nUSE DATABASE RAW;\nUSE SCHEMA SALES;\n\nCREATE OR REPLACE TABLE orders (\n    \"ORDER_ID\" VARCHAR,\n    \"AMOUNT\" VARCHAR,\n    \"SELECT\" VARCHAR -- This column name is not allowed\n);\n"
    );
    assert_eq!(
        object(&repo, "RAW/schemas/SALES/tables/audit.sql"),
        "USE ROLE LOADER;\nUSE DATABASE RAW;\nUSE SCHEMA SALES;\n\nCREATE OR REPLACE TABLE audit (\n    \"EVENT_ID\" NUMBER,\n    \"1ST_SEEN\" TIMESTAMP_NTZ -- Column name cannot start with a number\n);\n"
    );
}

#[test]
fn dynamic_tables_follow_existing_tables() {
    let repo = TemplateRepository::new(store(), layout());
    create_new_schema(&repo, "SALES", "raw_sales", &RunOptions::default()).unwrap();

    let options = RunOptions {
        source_schema: Some("SALES".to_string()),
        ..RunOptions::default()
    };
    let report = create_new_schema(&repo, "SALES", "curated_sales", &options).unwrap();

    assert_eq!(report.summary.created, 3);
    assert_eq!(
        object(&repo, "CURATED/schemas/SALES/dynamic_tables/customers_dt.sql"),
        "CREATE OR REPLACE DYNAMIC TABLE customers_dt\nTARGET_LAG = '1 hour'\nAS\nSELECT\n    TRIM(\"CUSTOMER_ID\") AS \"CUSTOMER_ID\",\n    TRIM(\"NAME\") AS \"NAME\"\nFROM RAW.SALES.customers;\n"
    );
    assert!(object(&repo, "CURATED/schemas/SALES/dynamic_tables/orders_dt.sql")
        .contains("TRIM(\"SELECT\") AS \"SELECT\" -- This column name is not allowed"));
}

#[test]
fn dynamic_tables_without_source_schema_abort_the_category() {
    let repo = TemplateRepository::new(store(), layout());
    let report = create_new_schema(&repo, "SALES", "curated_sales", &RunOptions::default()).unwrap();

    assert!(report.objects.is_empty());
    assert_eq!(report.category_failures.len(), 1);
    assert_eq!(report.category_failures[0].category, ObjectCategory::DynamicTables);
    assert!(report.category_failures[0].message.contains("source schema"));
}

#[test]
fn reruns_keep_files_unless_replacing() {
    let repo = TemplateRepository::new(store(), layout());
    create_new_schema(&repo, "SALES", "raw_sales", &RunOptions::default()).unwrap();

    let path = "/p/objects/databases/RAW/schemas/SALES/internal_stages/int_landing.sql";
    repo.store().write_text(Path::new(path), "edited by hand").unwrap();

    let again = create_new_schema(&repo, "SALES", "raw_sales", &RunOptions::default()).unwrap();
    assert_eq!(again.summary.unchanged, 6);
    assert_eq!(again.with_status(ObjectStatus::Created).count(), 0);
    assert_eq!(repo.store().file(path).as_deref(), Some("edited by hand"));

    let options = RunOptions {
        replace: true,
        env: "PROD".to_string(),
        ..RunOptions::default()
    };
    let replaced = create_new_schema(&repo, "SALES", "raw_sales", &options).unwrap();
    assert_eq!(replaced.summary.replaced, 6);
    assert_eq!(repo.store().file(path).as_deref(), Some("CREATE STAGE IF NOT EXISTS int_landing;\n"));
    assert!(object(&repo, "RAW/schemas/SALES/schema_definition/schema.sql").contains("USE DATABASE PROD_RAW;"));
}

#[test]
fn unknown_template_is_an_error() {
    let repo = TemplateRepository::new(store(), layout());
    let err = create_new_schema(&repo, "SALES", "nope", &RunOptions::default()).unwrap_err();
    assert!(matches!(err, EngineError::Repository(_)));
    assert!(repo.store().file_paths().iter().all(|p| !p.starts_with("/p/objects")));
}

#[test]
fn runs_against_the_local_file_system() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("sql_templates")).unwrap();
    fs::write(root.join("sql_templates/stage.sql"), STAGE_SQL).unwrap();
    fs::write(
        root.join("schemas.yaml"),
        "schemas:\n  - name: s\n    database: DB\n    role: R\n    internal_stages:\n      - object_name: Files\n        template_name: stage.sql\n",
    )
    .unwrap();

    let layout = ProjectLayout::new(root.join("objects"), root.join("schemas.yaml")).with_sql_templates(root.join("sql_templates"));
    let repo = TemplateRepository::new(LocalStore, layout);

    let report = create_new_schema(&repo, "LANDING", "s", &RunOptions::default()).unwrap();
    assert_eq!(report.summary.created, 1);
    assert_eq!(
        fs::read_to_string(root.join("objects/databases/DB/schemas/LANDING/internal_stages/files.sql")).unwrap(),
        "CREATE STAGE IF NOT EXISTS files;\n"
    );
}
