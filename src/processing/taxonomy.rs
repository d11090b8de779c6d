//! Skill taxonomy: alias resolution, categories and free-text extraction

use crate::error::{Result, ResumeRankerError};
use aho_corasick::{AhoCorasick, MatchKind};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Programming,
    Framework,
    Database,
    CloudDevops,
    DataMl,
    Tool,
    Soft,
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SkillCategory::Programming => "Programming",
            SkillCategory::Framework => "Framework",
            SkillCategory::Database => "Database",
            SkillCategory::CloudDevops => "Cloud/DevOps",
            SkillCategory::DataMl => "Data/ML",
            SkillCategory::Tool => "Tool",
            SkillCategory::Soft => "Soft skill",
        };
        write!(f, "{}", label)
    }
}

/// One canonical skill and the surface forms that resolve to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDefinition {
    pub name: String,
    pub category: SkillCategory,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TaxonomyFile {
    #[serde(default)]
    skills: Vec<SkillDefinition>,
}

/// Immutable alias → canonical mapping, built once and shared via `Arc`.
///
/// Resumes and job descriptions go through the same [`SkillTaxonomy::canonicalize`],
/// so "JS" on one side and "JavaScript" on the other compare equal.
pub struct SkillTaxonomy {
    alias_to_canonical: HashMap<String, String>,
    categories: HashMap<String, SkillCategory>,
    pattern_canonicals: Vec<String>,
    matcher: AhoCorasick,
}

impl fmt::Debug for SkillTaxonomy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkillTaxonomy")
            .field("skills", &self.categories.len())
            .field("aliases", &self.alias_to_canonical.len())
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct SkillTaxonomyBuilder {
    definitions: Vec<SkillDefinition>,
}

impl SkillTaxonomyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skill<I, S>(mut self, name: &str, category: SkillCategory, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.definitions.push(SkillDefinition {
            name: name.to_string(),
            category,
            aliases: aliases.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn definitions(mut self, definitions: Vec<SkillDefinition>) -> Self {
        self.definitions.extend(definitions);
        self
    }

    pub fn build(self) -> Result<SkillTaxonomy> {
        let mut alias_to_canonical: HashMap<String, String> = HashMap::new();
        let mut categories: HashMap<String, SkillCategory> = HashMap::new();
        let mut patterns: Vec<String> = Vec::new();
        let mut pattern_canonicals: Vec<String> = Vec::new();

        for definition in self.definitions {
            let canonical = definition.name.trim().to_lowercase();
            if normalize_key(&canonical).is_empty() {
                return Err(ResumeRankerError::Configuration(format!(
                    "skill name '{}' has no alphanumeric characters",
                    definition.name
                )));
            }
            if categories.insert(canonical.clone(), definition.category).is_some() {
                return Err(ResumeRankerError::Configuration(format!(
                    "skill '{}' is defined more than once",
                    canonical
                )));
            }

            let surface_forms = std::iter::once(canonical.clone())
                .chain(definition.aliases.iter().map(|alias| alias.trim().to_lowercase()));

            for surface in surface_forms {
                let key = normalize_key(&surface);
                if key.is_empty() {
                    continue;
                }

                match alias_to_canonical.get(&key) {
                    Some(existing) if existing != &canonical => {
                        return Err(ResumeRankerError::Configuration(format!(
                            "alias '{}' maps to both '{}' and '{}'",
                            surface, existing, canonical
                        )));
                    }
                    Some(_) => {}
                    None => {
                        alias_to_canonical.insert(key, canonical.clone());
                    }
                }

                if is_extractable(&surface) && !patterns.contains(&surface) {
                    patterns.push(surface);
                    pattern_canonicals.push(canonical.clone());
                }
            }
        }

        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::Standard)
            .build(&patterns)
            .map_err(|e| {
                ResumeRankerError::Configuration(format!("Failed to build skill matcher: {}", e))
            })?;

        debug!(
            "Built skill taxonomy: {} skills, {} aliases, {} extraction patterns",
            categories.len(),
            alias_to_canonical.len(),
            patterns.len()
        );

        Ok(SkillTaxonomy {
            alias_to_canonical,
            categories,
            pattern_canonicals,
            matcher,
        })
    }
}

impl SkillTaxonomy {
    pub fn builder() -> SkillTaxonomyBuilder {
        SkillTaxonomyBuilder::new()
    }

    /// Built-in taxonomy covering common technical and soft skills
    pub fn builtin() -> Result<Self> {
        SkillTaxonomyBuilder::new()
            .definitions(default_definitions())
            .build()
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: TaxonomyFile = toml::from_str(content)?;
        SkillTaxonomyBuilder::new().definitions(file.skills).build()
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Resolve a skill string to its canonical name.
    ///
    /// Unknown skills resolve to their normalized key.
    pub fn canonicalize(&self, skill: &str) -> String {
        let key = normalize_key(skill);
        self.alias_to_canonical
            .get(&key)
            .cloned()
            .unwrap_or(key)
    }

    pub fn categorize(&self, skill: &str) -> Option<SkillCategory> {
        self.categories.get(&self.canonicalize(skill)).copied()
    }

    pub fn is_known(&self, skill: &str) -> bool {
        self.alias_to_canonical.contains_key(&normalize_key(skill))
    }

    /// Canonical skills mentioned anywhere in free text, on word boundaries.
    ///
    /// A mention nested inside a longer accepted mention ("github" inside
    /// "github actions") is not counted separately. A longer alias that fails
    /// the boundary check ("rust lang" in "rust language") does not hide the
    /// shorter one.
    pub fn extract_skills(&self, text: &str) -> BTreeSet<String> {
        let spans: Vec<(usize, usize, usize)> = self
            .matcher
            .find_overlapping_iter(text)
            .filter(|mat| on_word_boundary(text, mat.start(), mat.end()))
            .map(|mat| (mat.start(), mat.end(), mat.pattern().as_usize()))
            .collect();

        spans
            .iter()
            .filter(|&&(start, end, _)| {
                !spans.iter().any(|&(other_start, other_end, _)| {
                    other_start <= start && end <= other_end && other_end - other_start > end - start
                })
            })
            .map(|&(_, _, pattern)| self.pattern_canonicals[pattern].clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Case- and punctuation-insensitive lookup key; `+` and `#` are spelled out
pub fn normalize_key(skill: &str) -> String {
    let mut key = String::with_capacity(skill.len());
    for c in skill.chars().flat_map(char::to_lowercase) {
        match c {
            '+' => key.push_str("plus"),
            '#' => key.push_str("sharp"),
            c if c.is_alphanumeric() => key.push(c),
            _ => {}
        }
    }
    key
}

/// Very short aliases ("go", "r", "js") are too ambiguous for free text
fn is_extractable(surface: &str) -> bool {
    surface.chars().count() > 2 || surface.contains(['+', '#'])
}

fn on_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before_ok = text
        .get(..start)
        .and_then(|prefix| prefix.chars().next_back())
        .map_or(true, |c| !c.is_alphanumeric());
    let after_ok = text
        .get(end..)
        .and_then(|suffix| suffix.chars().next())
        .map_or(true, |c| !(c.is_alphanumeric() || c == '+' || c == '#'));
    before_ok && after_ok
}

fn default_definitions() -> Vec<SkillDefinition> {
    use SkillCategory::*;

    let table: &[(&str, SkillCategory, &[&str])] = &[
        // Languages
        ("python", Programming, &["python3", "py"]),
        ("java", Programming, &["java8", "java11", "java17", "openjdk"]),
        ("javascript", Programming, &["js", "ecmascript", "es6"]),
        ("typescript", Programming, &["ts"]),
        ("c++", Programming, &["cpp", "c plus plus"]),
        ("c#", Programming, &["c sharp"]),
        ("go", Programming, &["golang", "go lang"]),
        ("rust", Programming, &["rust lang"]),
        ("ruby", Programming, &[]),
        ("php", Programming, &["php7", "php8"]),
        ("swift", Programming, &[]),
        ("kotlin", Programming, &[]),
        ("scala", Programming, &[]),
        ("r", Programming, &[]),
        ("matlab", Programming, &[]),
        ("perl", Programming, &[]),
        ("bash", Programming, &["shell scripting", "shell"]),
        ("sql", Programming, &[]),
        ("html", Programming, &["html5"]),
        ("css", Programming, &["css3"]),
        // Frameworks
        ("react", Framework, &["reactjs", "react.js"]),
        ("angular", Framework, &["angularjs", "angular.js"]),
        ("vue", Framework, &["vue.js", "vuejs"]),
        ("node.js", Framework, &["node", "node js"]),
        ("express", Framework, &["express.js", "expressjs"]),
        ("django", Framework, &["django rest framework", "drf"]),
        ("flask", Framework, &[]),
        ("fastapi", Framework, &["fast api"]),
        ("spring", Framework, &["spring boot", "springboot"]),
        (".net", Framework, &["dotnet", "asp.net"]),
        ("next.js", Framework, &[]),
        ("svelte", Framework, &[]),
        ("tailwind", Framework, &["tailwindcss", "tailwind css"]),
        ("bootstrap", Framework, &[]),
        ("jquery", Framework, &[]),
        // Databases
        ("postgresql", Database, &["postgres"]),
        ("mysql", Database, &["mariadb"]),
        ("mongodb", Database, &["mongo"]),
        ("redis", Database, &[]),
        ("cassandra", Database, &[]),
        ("dynamodb", Database, &[]),
        ("oracle", Database, &[]),
        ("sqlite", Database, &["sqlite3"]),
        ("elasticsearch", Database, &["elastic search"]),
        ("neo4j", Database, &[]),
        // Cloud and DevOps
        ("aws", CloudDevops, &["amazon web services"]),
        ("azure", CloudDevops, &["microsoft azure"]),
        ("gcp", CloudDevops, &["google cloud platform", "google cloud"]),
        ("docker", CloudDevops, &[]),
        ("kubernetes", CloudDevops, &["k8s"]),
        ("terraform", CloudDevops, &[]),
        ("ansible", CloudDevops, &[]),
        ("jenkins", CloudDevops, &[]),
        ("ci/cd", CloudDevops, &["continuous integration"]),
        ("github actions", CloudDevops, &[]),
        ("gitlab", CloudDevops, &[]),
        ("linux", CloudDevops, &[]),
        ("unix", CloudDevops, &[]),
        ("devops", CloudDevops, &[]),
        // Data and ML
        ("machine learning", DataMl, &["ml"]),
        ("deep learning", DataMl, &["dl"]),
        ("tensorflow", DataMl, &["tf"]),
        ("pytorch", DataMl, &[]),
        ("keras", DataMl, &[]),
        ("scikit-learn", DataMl, &["sklearn"]),
        ("pandas", DataMl, &[]),
        ("numpy", DataMl, &[]),
        ("nlp", DataMl, &["natural language processing"]),
        ("computer vision", DataMl, &[]),
        ("llm", DataMl, &["large language model", "large language models"]),
        ("spark", DataMl, &["apache spark", "pyspark"]),
        ("hadoop", DataMl, &[]),
        ("kafka", DataMl, &["apache kafka"]),
        ("airflow", DataMl, &["apache airflow"]),
        ("tableau", DataMl, &[]),
        ("power bi", DataMl, &[]),
        ("data analysis", DataMl, &[]),
        ("data visualization", DataMl, &[]),
        ("statistical analysis", DataMl, &[]),
        ("xgboost", DataMl, &[]),
        // Tools and practices
        ("git", Tool, &["github"]),
        ("jira", Tool, &[]),
        ("confluence", Tool, &[]),
        ("postman", Tool, &[]),
        ("graphql", Tool, &[]),
        ("grpc", Tool, &[]),
        ("rest api", Tool, &["restful api", "rest apis", "restful apis"]),
        ("microservices", Tool, &["microservice"]),
        ("rabbitmq", Tool, &[]),
        ("agile", Tool, &[]),
        ("scrum", Tool, &[]),
        // Soft skills
        ("leadership", Soft, &[]),
        ("communication", Soft, &["communication skills"]),
        ("teamwork", Soft, &["team work"]),
        ("problem solving", Soft, &[]),
        ("critical thinking", Soft, &[]),
        ("creativity", Soft, &[]),
        ("adaptability", Soft, &[]),
        ("time management", Soft, &[]),
        ("project management", Soft, &[]),
        ("collaboration", Soft, &[]),
        ("mentoring", Soft, &["mentorship"]),
        ("presentation", Soft, &["public speaking"]),
        ("negotiation", Soft, &[]),
    ];

    table
        .iter()
        .map(|(name, category, aliases)| SkillDefinition {
            name: name.to_string(),
            category: *category,
            aliases: aliases.iter().map(|alias| alias.to_string()).collect(),
        })
        .collect()
}
