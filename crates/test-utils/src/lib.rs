//! Seis Lab Data test utilities.
//!
//! Fixture builders for catalog rows, a database setup helper for the
//! ignored integration tests, and assertion helpers.

use chrono::NaiveDate;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

/// Environment variable naming the database used by integration tests.
pub const TEST_DATABASE_URL_VAR: &str = "SEISLAB_TEST_DATABASE_URL";

/// Connect to the integration test database.
///
/// Panics when the variable is unset; callers are `#[ignore]` tests.
pub async fn connect_test_db() -> PgPool {
    let url = std::env::var(TEST_DATABASE_URL_VAR)
        .unwrap_or_else(|_| panic!("{TEST_DATABASE_URL_VAR} must be set"));
    PgPool::connect(&url)
        .await
        .unwrap_or_else(|e| panic!("failed to connect to test database: {e}"))
}

/// Remove every catalog row, children first.
pub async fn truncate_catalog(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "TRUNCATE recordasset, surveyrelatedrecord, surveymission, project, \
         datasetcategory, domaintype, workflowstage CASCADE",
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// WKT for an axis-aligned box, closed ring.
pub fn bbox_wkt(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> String {
    format!(
        "POLYGON(({max_lon:?} {min_lat:?}, {max_lon:?} {max_lat:?}, {min_lon:?} {max_lat:?}, \
         {min_lon:?} {min_lat:?}, {max_lon:?} {min_lat:?}))"
    )
}

fn localized(en: &str) -> JsonValue {
    serde_json::json!({ "en": en })
}

/// Fields shared by projects, missions and records.
#[derive(Debug, Clone)]
pub struct Footprint {
    pub bbox_wkt: Option<String>,
    pub temporal_extent_begin: Option<NaiveDate>,
    pub temporal_extent_end: Option<NaiveDate>,
}

impl Footprint {
    fn empty() -> Self {
        Self {
            bbox_wkt: None,
            temporal_extent_begin: None,
            temporal_extent_end: None,
        }
    }
}

/// Create a test project with an English name.
pub fn test_project(en_name: &str) -> TestProject {
    TestProject {
        id: Uuid::new_v4(),
        owner: "tester".to_string(),
        name: localized(en_name),
        footprint: Footprint::empty(),
    }
}

/// A project fixture.
#[derive(Debug, Clone)]
pub struct TestProject {
    pub id: Uuid,
    pub owner: String,
    pub name: JsonValue,
    pub footprint: Footprint,
}

/// Create a test survey mission belonging to `project_id`.
pub fn test_survey_mission(project_id: Uuid, en_name: &str) -> TestSurveyMission {
    TestSurveyMission {
        id: Uuid::new_v4(),
        project_id,
        owner: "tester".to_string(),
        name: localized(en_name),
        footprint: Footprint::empty(),
    }
}

/// A survey mission fixture.
#[derive(Debug, Clone)]
pub struct TestSurveyMission {
    pub id: Uuid,
    pub project_id: Uuid,
    pub owner: String,
    pub name: JsonValue,
    pub footprint: Footprint,
}

/// Create a test survey-related record belonging to `survey_mission_id`.
pub fn test_survey_related_record(
    survey_mission_id: Uuid,
    en_name: &str,
) -> TestSurveyRelatedRecord {
    TestSurveyRelatedRecord {
        id: Uuid::new_v4(),
        survey_mission_id,
        owner: "tester".to_string(),
        name: localized(en_name),
        dataset_category_id: None,
        domain_type_id: None,
        workflow_stage_id: None,
        footprint: Footprint::empty(),
    }
}

/// A survey-related record fixture.
#[derive(Debug, Clone)]
pub struct TestSurveyRelatedRecord {
    pub id: Uuid,
    pub survey_mission_id: Uuid,
    pub owner: String,
    pub name: JsonValue,
    pub dataset_category_id: Option<Uuid>,
    pub domain_type_id: Option<Uuid>,
    pub workflow_stage_id: Option<Uuid>,
    pub footprint: Footprint,
}

/// Builder methods shared by fixtures with a name and footprint.
macro_rules! footprint_builders {
    ($fixture:ty) => {
        impl $fixture {
            /// Set a custom ID.
            pub fn with_id(mut self, id: Uuid) -> Self {
                self.id = id;
                self
            }

            /// Add a name in another language.
            pub fn with_name(mut self, language: &str, text: &str) -> Self {
                self.name[language] = JsonValue::String(text.to_string());
                self
            }

            /// Set the bounding box.
            pub fn with_bbox(
                mut self,
                min_lon: f64,
                min_lat: f64,
                max_lon: f64,
                max_lat: f64,
            ) -> Self {
                self.footprint.bbox_wkt = Some(bbox_wkt(min_lon, min_lat, max_lon, max_lat));
                self
            }

            /// Set the temporal extent.
            pub fn with_temporal_extent(
                mut self,
                begin: Option<NaiveDate>,
                end: Option<NaiveDate>,
            ) -> Self {
                self.footprint.temporal_extent_begin = begin;
                self.footprint.temporal_extent_end = end;
                self
            }
        }
    };
}

footprint_builders!(TestProject);
footprint_builders!(TestSurveyMission);
footprint_builders!(TestSurveyRelatedRecord);

impl TestProject {
    pub async fn insert(&self, pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO project (id, owner, name, bbox_4326, temporal_extent_begin, temporal_extent_end) \
             VALUES ($1, $2, $3, ST_GeomFromText($4, 4326), $5, $6)",
        )
        .bind(self.id)
        .bind(&self.owner)
        .bind(&self.name)
        .bind(&self.footprint.bbox_wkt)
        .bind(self.footprint.temporal_extent_begin)
        .bind(self.footprint.temporal_extent_end)
        .execute(pool)
        .await?;
        Ok(())
    }
}

impl TestSurveyMission {
    pub async fn insert(&self, pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO surveymission \
             (id, owner, name, project_id, bbox_4326, temporal_extent_begin, temporal_extent_end) \
             VALUES ($1, $2, $3, $4, ST_GeomFromText($5, 4326), $6, $7)",
        )
        .bind(self.id)
        .bind(&self.owner)
        .bind(&self.name)
        .bind(self.project_id)
        .bind(&self.footprint.bbox_wkt)
        .bind(self.footprint.temporal_extent_begin)
        .bind(self.footprint.temporal_extent_end)
        .execute(pool)
        .await?;
        Ok(())
    }
}

impl TestSurveyRelatedRecord {
    /// Set the vocabulary terms.
    pub fn with_terms(
        mut self,
        dataset_category_id: Option<Uuid>,
        domain_type_id: Option<Uuid>,
        workflow_stage_id: Option<Uuid>,
    ) -> Self {
        self.dataset_category_id = dataset_category_id;
        self.domain_type_id = domain_type_id;
        self.workflow_stage_id = workflow_stage_id;
        self
    }

    pub async fn insert(&self, pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO surveyrelatedrecord \
             (id, owner, name, survey_mission_id, dataset_category_id, domain_type_id, \
              workflow_stage_id, bbox_4326, temporal_extent_begin, temporal_extent_end) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, ST_GeomFromText($8, 4326), $9, $10)",
        )
        .bind(self.id)
        .bind(&self.owner)
        .bind(&self.name)
        .bind(self.survey_mission_id)
        .bind(self.dataset_category_id)
        .bind(self.domain_type_id)
        .bind(self.workflow_stage_id)
        .bind(&self.footprint.bbox_wkt)
        .bind(self.footprint.temporal_extent_begin)
        .bind(self.footprint.temporal_extent_end)
        .execute(pool)
        .await?;
        Ok(())
    }
}

/// Create a vocabulary term for `table` (`datasetcategory`, `domaintype`
/// or `workflowstage`).
pub fn test_term(table: &'static str, en_name: &str) -> TestTerm {
    TestTerm {
        id: Uuid::new_v4(),
        table,
        name: localized(en_name),
    }
}

/// A vocabulary term fixture.
#[derive(Debug, Clone)]
pub struct TestTerm {
    pub id: Uuid,
    pub table: &'static str,
    pub name: JsonValue,
}

impl TestTerm {
    /// Add a name in another language.
    pub fn with_name(mut self, language: &str, text: &str) -> Self {
        self.name[language] = JsonValue::String(text.to_string());
        self
    }

    pub async fn insert(&self, pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query(&format!(
            "INSERT INTO {} (id, name) VALUES ($1, $2)",
            self.table
        ))
        .bind(self.id)
        .bind(&self.name)
        .execute(pool)
        .await?;
        Ok(())
    }
}

/// Create a test asset belonging to `survey_related_record_id`.
pub fn test_asset(survey_related_record_id: Uuid, en_name: &str) -> TestAsset {
    TestAsset {
        id: Uuid::new_v4(),
        survey_related_record_id,
        name: localized(en_name),
        relative_path: format!("{}/{en_name}", survey_related_record_id.simple()),
    }
}

/// A record asset fixture.
#[derive(Debug, Clone)]
pub struct TestAsset {
    pub id: Uuid,
    pub survey_related_record_id: Uuid,
    pub name: JsonValue,
    pub relative_path: String,
}

impl TestAsset {
    pub async fn insert(&self, pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO recordasset (id, name, survey_related_record_id, relative_path) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(self.survey_related_record_id)
        .bind(&self.relative_path)
        .execute(pool)
        .await?;
        Ok(())
    }
}

/// Assertion helpers for JSON responses.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Assert that a list response holds exactly `expected` items.
    pub fn item_count(response: &Value, expected: usize) {
        let count = response
            .get("items")
            .and_then(Value::as_array)
            .map(Vec::len);
        assert_eq!(
            count,
            Some(expected),
            "Expected {expected} items, got: {response}"
        );
    }

    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert that a string does not contain a substring.
    pub fn not_contains(haystack: &str, needle: &str) {
        assert!(
            !haystack.contains(needle),
            "Expected string to NOT contain '{needle}'\nActual: {haystack}"
        );
    }
}
