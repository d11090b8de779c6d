//! Integration tests for the resume ranker

use chrono::NaiveDate;
use resume_ranker::config::Config;
use resume_ranker::input::InputManager;
use resume_ranker::output::{OutputFormat, RankingReport, ReportGenerator, ReportMetadata};
use resume_ranker::processing::batch::BatchScorer;
use resume_ranker::processing::embeddings::Embedder;
use resume_ranker::processing::experience::merged_months;
use resume_ranker::processing::grade::{Grade, GradeTable};
use resume_ranker::processing::records::{ExperienceEntry, ResumeRecord};
use resume_ranker::processing::scorer::{AtsScorer, ScoreComponent};
use resume_ranker::processing::semantic::{SemanticMethod, SemanticScorer};
use resume_ranker::processing::normalizer::TextNormalizer;
use resume_ranker::processing::skill_matcher::SkillMatcher;
use resume_ranker::processing::taxonomy::SkillTaxonomy;
use resume_ranker::{Result, ResumeRankerError};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Deterministic bag-of-words embedder
struct HashEmbedder;

impl Embedder for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; 64];
        for word in text.split_whitespace() {
            let hash = word
                .to_lowercase()
                .bytes()
                .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
            vector[hash % 64] += 1.0;
        }
        Ok(vector)
    }

    fn name(&self) -> &str {
        "hash-embedder"
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn scorer(config: Config, embedder: Option<Arc<dyn Embedder>>) -> AtsScorer {
    let mut builder = AtsScorer::builder(config).reference_date(date(2024, 6, 30));
    if let Some(embedder) = embedder {
        builder = builder.embedder(embedder);
    }
    builder.build().unwrap()
}

async fn job_text(name: &str) -> String {
    InputManager::new()
        .read_job_description(&Path::new("tests/fixtures").join(name))
        .await
        .unwrap()
}

async fn fixture_resume(id: &str) -> ResumeRecord {
    let path = PathBuf::from(format!("tests/fixtures/resumes/{}.json", id));
    InputManager::new().load_resume(&path).await.unwrap()
}

#[tokio::test]
async fn test_markdown_and_text_job_descriptions_agree() {
    let scorer = scorer(Config::default(), None);
    let from_txt = scorer.prepare_job(&job_text("jd.txt").await);
    let from_md = scorer.prepare_job(&job_text("jd.md").await);

    assert_eq!(from_txt.required_skills, from_md.required_skills);
    assert_eq!(from_md.title.as_deref(), Some("Senior Backend Engineer"));
    assert_eq!(from_md.min_years, Some(5.0));
    for skill in ["rust", "python", "postgresql", "kubernetes", "aws"] {
        assert!(from_md.required_skills.contains(skill), "missing {}", skill);
    }
}

#[tokio::test]
async fn test_end_to_end_score_with_embedder() {
    let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder);
    let scorer = scorer(Config::default(), Some(embedder));
    let alice = fixture_resume("alice").await;

    let score = scorer.score_text(&alice, &job_text("jd.txt").await).await.unwrap();
    let breakdown = &score.breakdown;

    assert_eq!(breakdown.semantic_method, SemanticMethod::Embedding);
    assert_eq!(score.semantic.embedder.as_deref(), Some("hash-embedder"));
    assert!(breakdown.degraded.is_empty());
    assert!(score.skill_match.missing.is_empty());
    assert_eq!(breakdown.component(ScoreComponent::Skills), 100.0);
    assert!(breakdown.total > 0.0 && breakdown.total <= 100.0);
}

#[tokio::test]
async fn test_total_is_weighted_sum_for_any_valid_weights() {
    let weight_sets = [
        [0.2, 0.2, 0.2, 0.2, 0.2],
        [1.0, 0.0, 0.0, 0.0, 0.0],
        [0.1, 0.4, 0.3, 0.15, 0.05],
        [0.0, 0.0, 0.0, 0.0, 1.0],
    ];
    let bob = fixture_resume("bob").await;
    let job = job_text("jd.txt").await;

    for [keyword, skills, experience, semantic, format] in weight_sets {
        let mut config = Config::default();
        config.scoring.keyword = keyword;
        config.scoring.skills = skills;
        config.scoring.experience = experience;
        config.scoring.semantic = semantic;
        config.scoring.format = format;

        let scorer = scorer(config, None);
        let breakdown = scorer.score_text(&bob, &job).await.unwrap().breakdown;
        let expected: f64 = ScoreComponent::ALL
            .iter()
            .map(|c| c.weight(scorer.weights()) * breakdown.component(*c))
            .sum();
        assert!((breakdown.total - expected).abs() < 1e-9);
    }
}

#[test]
fn test_grade_boundaries() {
    let table = GradeTable::default();
    let cases = [
        (0.0, Grade::F),
        (49.99, Grade::F),
        (50.0, Grade::D),
        (59.99, Grade::D),
        (60.0, Grade::C),
        (69.99, Grade::C),
        (70.0, Grade::B),
        (79.99, Grade::B),
        (80.0, Grade::A),
        (89.99, Grade::A),
        (90.0, Grade::APlus),
        (100.0, Grade::APlus),
    ];
    for (total, grade) in cases {
        assert_eq!(table.grade(total), grade, "total {}", total);
    }
}

#[test]
fn test_js_and_javascript_match() {
    let taxonomy = Arc::new(SkillTaxonomy::builtin().unwrap());
    assert_eq!(taxonomy.canonicalize("JS"), taxonomy.canonicalize("JavaScript"));

    let required: BTreeSet<String> = ["javascript".to_string()].into();
    let result = SkillMatcher::new(taxonomy).match_skills(&["JS"], &required);
    assert_eq!(result.score, 100.0);
    assert_eq!(result.matched, vec!["javascript".to_string()]);
}

#[test]
fn test_partial_skill_match() {
    let matcher = SkillMatcher::new(Arc::new(SkillTaxonomy::builtin().unwrap()));

    let required: BTreeSet<String> = ["python", "sql", "aws"].iter().map(|s| s.to_string()).collect();
    let result = matcher.match_skills(&["Python", "SQL"], &required);
    assert!((result.score - 66.666_666).abs() < 0.01);
    assert_eq!(result.missing, vec!["aws".to_string()]);

    let result = matcher.match_skills(&["Python"], &BTreeSet::new());
    assert_eq!(result.score, 100.0);
    assert!(result.missing.is_empty());
}

#[test]
fn test_overlapping_roles_merge() {
    let entries = vec![
        ExperienceEntry::new("Engineer", "A", date(2021, 1, 1), Some(date(2021, 12, 31))).unwrap(),
        ExperienceEntry::new("Consultant", "B", date(2021, 6, 1), Some(date(2021, 12, 31))).unwrap(),
    ];
    assert_eq!(merged_months(&entries, date(2024, 6, 30)).unwrap(), 12);
}

#[tokio::test]
async fn test_semantic_fallback_never_fails() {
    let scorer = SemanticScorer::new(None, Arc::new(TextNormalizer::new()), Duration::from_millis(100));
    for (resume, job) in [("", ""), ("", "rust"), ("rust", ""), ("the and of", "a an the")] {
        let result = scorer.score(resume, job).await;
        assert_eq!(result.method, SemanticMethod::LexicalFallback);
        assert!((0.0..=100.0).contains(&result.score));
    }
}

#[tokio::test]
async fn test_rank_fixture_directory() {
    let config = Config::default();
    let scorer = Arc::new(scorer(config.clone(), None));
    let job = Arc::new(scorer.prepare_job(&job_text("jd.md").await));

    let loaded = InputManager::new()
        .load_resumes(&[PathBuf::from("tests/fixtures/resumes")])
        .await
        .unwrap();
    assert_eq!(loaded.records.len(), 3);

    let batch = BatchScorer::new(Arc::clone(&scorer), &config).unwrap();
    let first = batch.run(Arc::clone(&job), loaded.records.clone()).await.unwrap();

    let order: Vec<&str> = first.ranking.all().iter().map(|c| c.id()).collect();
    assert_eq!(order, vec!["alice", "bob", "carol"]);

    let mut reversed = loaded.records;
    reversed.reverse();
    let second = BatchScorer::new(scorer, &config)
        .unwrap()
        .with_max_concurrency(1)
        .run(job, reversed)
        .await
        .unwrap();
    assert_eq!(first.ranking, second.ranking);

    for k in 0..=4 {
        let top = first.ranking.top(k);
        assert_eq!(top, &first.ranking.all()[..top.len()]);
    }

    let report = RankingReport::new(
        ReportMetadata::new("Senior Backend Engineer", None, date(2024, 6, 30)),
        first,
        Some(2),
    );
    let json = ReportGenerator::new().ranking_report(&report, OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["total_ranked"], 3);
    assert_eq!(value["candidates"].as_array().unwrap().len(), 2);
    assert_eq!(value["candidates"][0]["record"]["id"], "alice");
}

#[tokio::test]
async fn test_invalid_record_rejected_on_load() {
    let path = Path::new("tests/fixtures/invalid/bad_dates.json");
    let result = InputManager::new().load_resume(path).await;
    assert!(matches!(result, Err(ResumeRankerError::InvalidInput(_))));

    let loaded = InputManager::new()
        .load_resumes(&[PathBuf::from("tests/fixtures/invalid")])
        .await
        .unwrap();
    assert!(loaded.records.is_empty());
    assert_eq!(loaded.failures.len(), 1);
}

#[tokio::test]
async fn test_config_file_drives_scoring() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[scoring]\nkeyword = 0.0\nskills = 1.0\nexperience = 0.0\nsemantic = 0.0\nformat = 0.0\n",
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    let scorer = scorer(config, None);
    let alice = fixture_resume("alice").await;
    let score = scorer.score_text(&alice, &job_text("jd.txt").await).await.unwrap();
    assert_eq!(score.breakdown.total, 100.0);
    assert_eq!(score.breakdown.grade, Grade::APlus);
}
