//! Quality validator: applies the rubric to text and aggregates results.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;
use url::Url;

use contentgate_shared::QualityConfig;
use contentgate_text::char_count;

use crate::report::{BatchQualitySummary, QualityLevel, QualityReport};
use crate::rubric::{self, FactorScore, TrustTier};

/// Scores `(content, url)` pairs. Holds only read-only config, so it is
/// safe to share across threads and every call is deterministic.
#[derive(Debug, Clone)]
pub struct QualityValidator {
    config: QualityConfig,
    keywords: Vec<String>,
}

impl Default for QualityValidator {
    fn default() -> Self {
        Self::new(QualityConfig::default())
    }
}

impl QualityValidator {
    pub fn new(config: QualityConfig) -> Self {
        let keywords = config
            .relevance_keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { config, keywords }
    }

    /// Score one piece of content. Empty content short-circuits to `Invalid`.
    pub fn validate(&self, content: &str, url: &str) -> QualityReport {
        if content.is_empty() {
            return QualityReport {
                url: url.to_string(),
                valid: false,
                score: 0,
                level: QualityLevel::Invalid,
                issues: vec!["empty content".to_string()],
                strengths: Vec::new(),
                content_length: 0,
                word_count: 0,
            };
        }

        let content_length = char_count(content);
        let word_count = content.split_whitespace().count();
        let trust = self.trust_tier(url);

        let factors = [
            rubric::LENGTH.score(content_length),
            rubric::WORD_DENSITY.score(word_count),
            rubric::STRUCTURED_DATA.score(rubric::count_data_matches(content)),
            FactorScore {
                points: trust.points(),
                strength: trust.strength(),
                issue: None,
            },
            rubric::RELEVANCE.score(self.relevance_hits(content)),
        ];

        let score: u32 = factors.iter().map(|f| f.points).sum();
        let issues = factors
            .iter()
            .filter_map(|f| f.issue.map(String::from))
            .collect();
        let strengths = factors
            .iter()
            .filter_map(|f| f.strength.map(String::from))
            .collect();
        let level = rubric::level_for(score);
        let valid =
            content_length >= self.config.min_content_length && score >= self.config.min_valid_score;

        debug!(%url, score, %level, valid, "content validated");

        QualityReport {
            url: url.to_string(),
            valid,
            score,
            level,
            issues,
            strengths,
            content_length,
            word_count,
        }
    }

    /// Validate every `url → content` entry.
    pub fn validate_batch(&self, contents: &HashMap<String, String>) -> HashMap<String, QualityReport> {
        contents
            .iter()
            .map(|(url, content)| (url.clone(), self.validate(content, url)))
            .collect()
    }

    /// Validate extractor output; absent content validates as empty.
    pub fn validate_extracted(
        &self,
        extracted: &HashMap<String, Option<String>>,
    ) -> HashMap<String, QualityReport> {
        extracted
            .iter()
            .map(|(url, content)| {
                let report = self.validate(content.as_deref().unwrap_or_default(), url);
                (url.clone(), report)
            })
            .collect()
    }

    /// Aggregate a set of reports.
    pub fn summarize(&self, reports: &HashMap<String, QualityReport>) -> BatchQualitySummary {
        let total_validated = reports.len();
        let valid_count = reports.values().filter(|r| r.valid).count();

        let mut level_distribution = BTreeMap::new();
        for report in reports.values() {
            *level_distribution.entry(report.level).or_insert(0) += 1;
        }

        let (success_rate_percent, average_score) = if total_validated == 0 {
            (0.0, 0.0)
        } else {
            let total_score: u64 = reports.values().map(|r| u64::from(r.score)).sum();
            let mean = total_score as f64 / total_validated as f64;
            (
                valid_count as f64 / total_validated as f64 * 100.0,
                (mean * 100.0).round() / 100.0,
            )
        };

        BatchQualitySummary {
            total_validated,
            valid_count,
            invalid_count: total_validated - valid_count,
            success_rate_percent,
            average_score,
            level_distribution,
        }
    }

    /// Classify the URL's host. Unparsable URLs fall into `Other`.
    fn trust_tier(&self, url: &str) -> TrustTier {
        let domain = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase))
            .unwrap_or_default();

        if domain.is_empty() {
            return TrustTier::Other;
        }

        let contains_any = |list: &[String]| {
            list.iter()
                .any(|fragment| !fragment.is_empty() && domain.contains(&fragment.to_lowercase()))
        };

        if contains_any(&self.config.trusted_domains) {
            TrustTier::Official
        } else if contains_any(&self.config.news_domains) {
            TrustTier::Journalistic
        } else if !self.config.national_suffix.is_empty()
            && domain.ends_with(&self.config.national_suffix.to_lowercase())
        {
            TrustTier::National
        } else {
            TrustTier::Other
        }
    }

    /// Keyword occurrences summed over every relevance keyword.
    fn relevance_hits(&self, content: &str) -> usize {
        let lower = content.to_lowercase();
        self.keywords
            .iter()
            .map(|keyword| lower.matches(keyword.as_str()).count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> QualityValidator {
        QualityValidator::default()
    }

    /// ~2.5k chars: five percentages, "mercado" four times, no other signals.
    fn official_statistics_text() -> String {
        let mut content: String = [12, 7, 18, 4]
            .iter()
            .map(|n| format!("O mercado regional avançou {n}% no período analisado pelo instituto. "))
            .collect();
        content.push_str("A indústria local também subiu 9% segundo o levantamento oficial. ");
        while char_count(&content) < 2500 {
            content.push_str("Texto complementar descreve o contexto regional sem citar valores. ");
        }
        content.trim().to_string()
    }

    fn neutral_text() -> String {
        "Paragraph about ordinary things written without any figures at all. ".repeat(10)
    }

    #[test]
    fn empty_content_is_invalid() {
        let report = validator().validate("", "https://example.com");
        assert!(!report.valid);
        assert_eq!(report.score, 0);
        assert_eq!(report.level, QualityLevel::Invalid);
        assert_eq!(report.issues, vec!["empty content"]);
        assert!(report.strengths.is_empty());
        assert_eq!(report.content_length, 0);
    }

    #[test]
    fn whitespace_only_runs_the_rubric() {
        let report = validator().validate("   ", "https://example.com");
        assert_eq!(report.level, QualityLevel::Poor);
        assert_eq!(report.score, 5);
        assert_eq!(report.word_count, 0);
        assert_eq!(report.issues.first().map(String::as_str), Some("content too short"));
    }

    #[test]
    fn hundred_chars_without_signals() {
        let content = "abcdefghi ".repeat(10);
        let report = validator().validate(&content, "https://example.com");

        assert_eq!(report.content_length, 100);
        assert_eq!(report.word_count, 10);
        // 10 (length) + 0 (words) + 0 (data) + 5 (trust) + 0 (relevance)
        assert_eq!(report.score, 15);
        assert_eq!(report.level, QualityLevel::Poor);
        assert!(!report.valid);
        assert_eq!(
            report.issues,
            vec!["low word density", "little structured data", "low topical relevance"]
        );
        assert!(report.strengths.is_empty());
    }

    #[test]
    fn hundred_words_meets_validity_floor() {
        let content = ["a"; 100].join(" ");
        let report = validator().validate(&content, "https://example.com");

        assert_eq!(report.word_count, 100);
        // 10 (length) + 15 (words) + 0 + 5 (trust) + 0
        assert_eq!(report.score, 30);
        assert_eq!(report.level, QualityLevel::Poor);
        assert!(report.valid);
    }

    #[test]
    fn official_source_with_percentages() {
        let content = official_statistics_text();
        let report = validator().validate(&content, "https://www.ibge.gov.br/estatisticas");

        assert!(report.content_length >= 2500);
        // 25 (length) + 25 (words) + 15 (data) + 15 (trust) + 8 (relevance)
        assert_eq!(report.score, 88);
        assert!(report.level >= QualityLevel::Good);
        assert!(report.valid);
        assert_eq!(
            report.strengths,
            vec!["extensive content", "high word density", "official or trusted source"]
        );
        assert!(report.issues.is_empty());
    }

    #[test]
    fn signal_dense_report_is_excellent() {
        let content = "Pesquisa de mercado mostra 12% de crescimento e 300 empresas em 2024 com R$ 5 milhões investidos. "
            .repeat(25);
        let report = validator().validate(&content, "https://www.gov.br/dados");

        assert_eq!(report.score, 100);
        assert_eq!(report.level, QualityLevel::Excellent);
        assert_eq!(report.strengths.len(), 5);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn short_content_is_invalid_even_with_a_passing_score() {
        let content = "Mercado: 10% 20% 30% 40% 50% 60% 70% 80% 90% 11%, estudo, dados, pesquisa, empresa e tendência.";
        let report = validator().validate(content, "https://www.gov.br/x");

        assert_eq!(report.content_length, 95);
        assert_eq!(report.score, 47);
        assert_eq!(report.level, QualityLevel::Poor);
        assert!(!report.valid);
        assert_eq!(report.issues[0], "content too short");
    }

    #[test]
    fn trust_tiers_by_domain() {
        let v = validator();
        let content = neutral_text();
        let score_for = |url: &str| v.validate(&content, url).score;

        // 15 (length) + 15 (words) + trust
        assert_eq!(score_for("https://sebrae.com.br/x"), 45);
        assert_eq!(score_for("https://g1.globo.com/economia"), 42);
        assert_eq!(score_for("https://loja.exemplo.com.br/"), 38);
        assert_eq!(score_for("https://example.org/"), 35);
        assert_eq!(score_for("not a url"), 35);

        let news = v.validate(&content, "https://G1.GLOBO.COM/economia");
        assert_eq!(news.strengths, vec!["trusted journalistic source"]);
    }

    #[test]
    fn english_data_keyword_counts_toward_relevance() {
        let content = format!("{} New data, more data, open data.", neutral_text());
        let report = validator().validate(&content, "https://example.org/");
        // 15 (length) + 15 (words) + 0 + 5 (trust) + 8 (relevance)
        assert_eq!(report.score, 43);
        assert!(!report.issues.contains(&"low topical relevance".to_string()));
    }

    #[test]
    fn validity_is_independent_of_level() {
        let report = validator().validate(&neutral_text(), "https://example.org/");
        assert_eq!(report.level, QualityLevel::Poor);
        assert!(report.valid);
    }

    #[test]
    fn validation_is_deterministic() {
        let v = validator();
        let content = official_statistics_text();
        let first = v.validate(&content, "https://www.ibge.gov.br/");
        let second = v.validate(&content, "https://www.ibge.gov.br/");
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn custom_keywords_and_domains() {
        let config = QualityConfig {
            trusted_domains: vec!["ons.gov.uk".into()],
            news_domains: vec![],
            national_suffix: ".co.uk".into(),
            relevance_keywords: vec!["Inflation".into()],
            ..QualityConfig::default()
        };
        let v = QualityValidator::new(config);
        let content = format!("{} inflation inflation INFLATION", neutral_text());

        let official = v.validate(&content, "https://www.ons.gov.uk/economy");
        assert!(official.strengths.contains(&"official or trusted source".to_string()));
        assert!(!official.issues.contains(&"low topical relevance".to_string()));

        let national = v.validate(&content, "https://shop.example.co.uk/");
        assert_eq!(official.score - national.score, 7);
    }

    #[test]
    fn batch_validates_every_key() {
        let contents = HashMap::from([
            ("https://a.example/".to_string(), neutral_text()),
            ("https://b.example/".to_string(), String::new()),
        ]);
        let reports = validator().validate_batch(&contents);

        assert_eq!(reports.len(), 2);
        assert_eq!(reports["https://a.example/"].url, "https://a.example/");
        assert_eq!(reports["https://b.example/"].level, QualityLevel::Invalid);
    }

    #[test]
    fn extracted_absence_validates_as_empty() {
        let extracted = HashMap::from([
            ("https://ok.example/".to_string(), Some(neutral_text())),
            ("https://gone.example/".to_string(), None),
        ]);
        let reports = validator().validate_extracted(&extracted);

        assert!(reports["https://ok.example/"].valid);
        let gone = &reports["https://gone.example/"];
        assert!(!gone.valid);
        assert_eq!(gone.level, QualityLevel::Invalid);
    }

    #[test]
    fn summary_aggregates_reports() {
        let v = validator();
        let contents = HashMap::from([
            ("https://www.gov.br/a".to_string(), official_statistics_text()),
            ("https://example.org/b".to_string(), neutral_text()),
            ("https://example.org/c".to_string(), String::new()),
        ]);
        let summary = v.summarize(&v.validate_batch(&contents));

        assert_eq!(summary.total_validated, 3);
        assert_eq!(summary.valid_count, 2);
        assert_eq!(summary.invalid_count, 1);
        assert!((summary.success_rate_percent - 200.0 / 3.0).abs() < 1e-9);
        // (88 + 35 + 0) / 3 = 41.0
        assert_eq!(summary.average_score, 41.0);
        assert_eq!(summary.level_distribution[&QualityLevel::Good], 1);
        assert_eq!(summary.level_distribution[&QualityLevel::Poor], 1);
        assert_eq!(summary.level_distribution[&QualityLevel::Invalid], 1);
        assert!(!summary.level_distribution.contains_key(&QualityLevel::Excellent));
    }

    #[test]
    fn empty_summary_is_zeroed() {
        let summary = validator().summarize(&HashMap::new());
        assert_eq!(summary.total_validated, 0);
        assert_eq!(summary.success_rate_percent, 0.0);
        assert_eq!(summary.average_score, 0.0);
        assert!(summary.level_distribution.is_empty());
    }

    #[test]
    fn average_is_rounded_to_two_decimals() {
        let v = validator();
        let contents = HashMap::from([
            ("https://example.org/1".to_string(), neutral_text()),
            ("https://example.org/2".to_string(), neutral_text()),
            ("https://example.org/3".to_string(), "abcdefghi ".repeat(10)),
        ]);
        let summary = v.summarize(&v.validate_batch(&contents));
        // (35 + 35 + 15) / 3 = 28.333...
        assert_eq!(summary.average_score, 28.33);
    }
}
