//! Report entry points.
//!
//! [`WeightRationaleEngine`] owns the evidence sources and the augmentation
//! layer and exposes one entry point per report:
//!
//! ```text
//! fundamentals_report:  validate ─► fetch ─► normalize ─► score ─► [augment]
//! news_report:          validate ─► retrieve ─► score/rank ─► opinion ─► [augment]
//! combined_report:      validate ─► (fetch ∥ retrieve) ─► both components ─► combine ─► [augment]
//! ```
//!
//! Validation runs before any network access. Vendor failures degrade to
//! empty evidence; augmentation failures are recorded on the report.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{debug, info, info_span, warn, Instrument};

use crate::augment::prompts::{fundamentals_prompt, news_prompt, SummaryPrompt, AGENT_MAX_POINTS};
use crate::augment::{AugmentOutcome, AugmentationLayer, AugmentationStatus};
use crate::error::Result;
use crate::fundamentals::{
    metrics_prompt_summary, metrics_table, FundamentalReport, FundamentalScorer, FundamentalsSource,
    MetricMap, MetricNormalizer, YahooFundamentalsSource,
};
use crate::news::{
    net_sentiment, prompt_digest, NewsArticle, NewsRetriever, NewsScorer, NewsWeightReport,
};
use crate::request::{AugmentOptions, NewsWindow, ReportRequest, ValidatedRequest};
use crate::synthesis::{SynthesisCombiner, WeightSynthesisReport, MAX_SUMMARY_POINTS};
use weight_common::logging::generate_trace_id;
use weight_common::Config;

/// Produces fundamentals, news, and combined weight reports.
#[derive(Clone)]
pub struct WeightRationaleEngine {
    fundamentals: Arc<dyn FundamentalsSource>,
    news: NewsRetriever,
    augmentation: AugmentationLayer,
    /// Reference date for requests without `as_of`; today when unset.
    default_as_of: Option<NaiveDate>,
}

impl WeightRationaleEngine {
    pub fn new(fundamentals: Arc<dyn FundamentalsSource>, news: NewsRetriever) -> Self {
        Self {
            fundamentals,
            news,
            augmentation: AugmentationLayer::new(String::new()),
            default_as_of: None,
        }
    }

    /// Vendor sources and providers as configured.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(YahooFundamentalsSource::from_config(&config.fundamentals)),
            NewsRetriever::from_config(&config.news),
        )
        .with_augmentation(AugmentationLayer::from_config(&config.llm))
    }

    pub fn with_augmentation(mut self, augmentation: AugmentationLayer) -> Self {
        self.augmentation = augmentation;
        self
    }

    /// Pin the date used when a request carries no `as_of`.
    pub fn with_default_as_of(mut self, as_of: NaiveDate) -> Self {
        self.default_as_of = Some(as_of);
        self
    }

    pub fn augmentation(&self) -> &AugmentationLayer {
        &self.augmentation
    }

    fn reference_date(&self) -> NaiveDate {
        self.default_as_of.unwrap_or_else(|| Local::now().date_naive())
    }

    // ========================================================================
    // Entry points
    // ========================================================================

    /// Fundamentals-only report.
    pub async fn fundamentals_report(&self, request: &ReportRequest) -> Result<FundamentalReport> {
        let validated = request.validate_base(self.reference_date())?;
        let span = report_span("fundamentals", &validated.ticker);

        async {
            let metrics = self.fetch_metrics(&validated.ticker).await;
            let mut report = build_fundamental_report(&validated, metrics);
            if request.augment.enabled {
                self.augment_fundamentals(&mut report, &request.augment).await;
            }
            info!(
                points = report.rationale_points.len(),
                score = report.score,
                augmented = report.generated_via_augmentation(),
                "Fundamentals report ready"
            );
            Ok(report)
        }
        .instrument(span)
        .await
    }

    /// News-only report.
    pub async fn news_report(&self, request: &ReportRequest) -> Result<NewsWeightReport> {
        let (validated, window) = request.validate_news(self.reference_date())?;
        let span = report_span("news", &validated.ticker);

        async {
            let articles = self.gather_articles(&validated.ticker, &window).await;
            let mut report = build_news_report(&validated, &window, articles);
            if request.augment.enabled {
                self.augment_news(&mut report, &request.augment).await;
            }
            info!(
                articles = report.articles.len(),
                points = report.points.len(),
                augmented = report.generated_via_augmentation(),
                "News report ready"
            );
            Ok(report)
        }
        .instrument(span)
        .await
    }

    /// Both streams plus the unified summary.
    ///
    /// The component reports are always deterministic; only the unified
    /// summary is augmented.
    pub async fn combined_report(&self, request: &ReportRequest) -> Result<WeightSynthesisReport> {
        let (validated, window) = request.validate_news(self.reference_date())?;
        let span = report_span("combined", &validated.ticker);

        async {
            let (metrics, articles) = tokio::join!(
                self.fetch_metrics(&validated.ticker),
                self.gather_articles(&validated.ticker, &window),
            );

            let fundamental_report = build_fundamental_report(&validated, metrics);
            let news_report = build_news_report(&validated, &window, articles);
            let summary_points = SynthesisCombiner.combine(
                &fundamental_report.rationale_points,
                &news_report.points,
                &fundamental_report.metrics,
                &news_report.articles,
            );

            let mut report = WeightSynthesisReport {
                ticker: validated.ticker.clone(),
                weight: validated.weight,
                as_of: validated.as_of,
                lookback_days: window.lookback_days,
                summary_points,
                fundamental_report,
                news_report,
                augmentation: AugmentationStatus::NotRequested,
            };
            if request.augment.enabled {
                self.augment_summary(&mut report, &request.augment).await;
            }
            info!(
                points = report.summary_points.len(),
                augmented = report.generated_via_augmentation(),
                "Combined report ready"
            );
            Ok(report)
        }
        .instrument(span)
        .await
    }

    // ========================================================================
    // Evidence
    // ========================================================================

    async fn fetch_metrics(&self, ticker: &str) -> MetricMap {
        match self.fundamentals.fetch(ticker).await {
            Ok(bundle) => {
                let metrics = MetricNormalizer.normalize(&bundle);
                debug!(
                    source = self.fundamentals.name(),
                    present = metrics.present().count(),
                    "Fundamentals normalized"
                );
                metrics
            }
            Err(err) => {
                warn!(source = self.fundamentals.name(), error = %err, "Fundamentals fetch failed");
                MetricMap::empty()
            }
        }
    }

    async fn gather_articles(&self, ticker: &str, window: &NewsWindow) -> Vec<NewsArticle> {
        let articles = self.news.retrieve(ticker, window).await;
        NewsScorer.score_and_rank(articles, window.max_articles)
    }

    // ========================================================================
    // Augmentation
    // ========================================================================

    async fn augment_fundamentals(&self, report: &mut FundamentalReport, options: &AugmentOptions) {
        let prompt = fundamentals_prompt(
            &report.ticker,
            report.weight,
            report.as_of,
            &metrics_prompt_summary(&report.metrics),
            &metrics_table(&report.metrics),
        );
        let outcome = self
            .augmentation
            .generate_bullets(&prompt, AGENT_MAX_POINTS, options.model.as_deref())
            .await;
        report.augmentation = outcome.status();
        if let AugmentOutcome::Generated { points, .. } = outcome {
            report.rationale_points = points;
        }
    }

    async fn augment_news(&self, report: &mut NewsWeightReport, options: &AugmentOptions) {
        let prompt = news_prompt(
            &report.ticker,
            report.weight,
            report.as_of,
            report.lookback_days,
            net_sentiment(&report.articles),
            &prompt_digest(&report.articles),
        );
        let outcome = self
            .augmentation
            .generate_bullets(&prompt, AGENT_MAX_POINTS, options.model.as_deref())
            .await;
        report.augmentation = outcome.status();
        if let AugmentOutcome::Generated { points, .. } = outcome {
            if let Some(first) = points.first() {
                report.judgement = first.clone();
            }
            report.points = points;
        }
    }

    async fn augment_summary(&self, report: &mut WeightSynthesisReport, options: &AugmentOptions) {
        let fundamentals_md = report.fundamental_report.to_markdown(true);
        let news_md = report.news_report.to_markdown(true);
        let max_points = match report.summary_points.len() {
            0 => MAX_SUMMARY_POINTS,
            n => n,
        };
        let prompt = SummaryPrompt {
            ticker: &report.ticker,
            weight: report.weight,
            as_of: report.as_of,
            fundamental_points: &report.fundamental_report.rationale_points,
            news_points: &report.news_report.points,
            metrics_table: &fundamentals_md,
            news_table: &news_md,
            max_points,
        }
        .render();

        let outcome = self
            .augmentation
            .generate_bullets(&prompt, max_points, options.model.as_deref())
            .await;
        report.augmentation = outcome.status();
        if let AugmentOutcome::Generated { points, .. } = outcome {
            report.summary_points = points;
        }
    }
}

impl std::fmt::Debug for WeightRationaleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeightRationaleEngine")
            .field("fundamentals", &self.fundamentals.name())
            .field("augmentation", &self.augmentation)
            .field("default_as_of", &self.default_as_of)
            .finish_non_exhaustive()
    }
}

fn report_span(kind: &'static str, ticker: &str) -> tracing::Span {
    info_span!("report", kind, ticker = %ticker, request_id = %generate_trace_id())
}

fn build_fundamental_report(request: &ValidatedRequest, metrics: MetricMap) -> FundamentalReport {
    let rationale = FundamentalScorer.score(&request.ticker, request.weight, &metrics);
    FundamentalReport {
        ticker: request.ticker.clone(),
        weight: request.weight,
        as_of: request.as_of,
        rationale_points: rationale.points,
        metrics,
        score: rationale.score,
        augmentation: AugmentationStatus::NotRequested,
    }
}

fn build_news_report(request: &ValidatedRequest, window: &NewsWindow, articles: Vec<NewsArticle>) -> NewsWeightReport {
    let opinion = NewsScorer.opinion(request.weight, &articles);
    NewsWeightReport {
        ticker: request.ticker.clone(),
        weight: request.weight,
        as_of: request.as_of,
        lookback_days: window.lookback_days,
        judgement: opinion.judgement,
        points: opinion.points,
        articles,
        augmentation: AugmentationStatus::NotRequested,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::augment::{AugmentError, ProviderKind, TextGenerator};
    use crate::fundamentals::FundamentalsBundle;
    use crate::news::{NewsPayload, NewsSource};
    use crate::source::SourceError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct StaticFundamentals(FundamentalsBundle);

    #[async_trait]
    impl FundamentalsSource for StaticFundamentals {
        fn name(&self) -> &'static str {
            "static"
        }

        async fn fetch(&self, _ticker: &str) -> std::result::Result<FundamentalsBundle, SourceError> {
            Ok(self.0.clone())
        }
    }

    struct FailingFundamentals;

    #[async_trait]
    impl FundamentalsSource for FailingFundamentals {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn fetch(&self, _ticker: &str) -> std::result::Result<FundamentalsBundle, SourceError> {
            Err(SourceError::Network("connection reset".into()))
        }
    }

    struct StaticNews(serde_json::Value);

    #[async_trait]
    impl NewsSource for StaticNews {
        fn name(&self) -> &'static str {
            "static"
        }

        async fn fetch(&self, _ticker: &str, _window: &NewsWindow) -> std::result::Result<NewsPayload, SourceError> {
            Ok(NewsPayload::from_value(self.0.clone()))
        }
    }

    struct Canned {
        reply: String,
        calls: AtomicU32,
    }

    #[async_trait]
    impl TextGenerator for Canned {
        fn kind(&self) -> ProviderKind {
            ProviderKind::OpenAi
        }

        async fn generate(&self, _prompt: &str, _model: &str) -> std::result::Result<String, AugmentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 8).unwrap()
    }

    fn strong_bundle() -> FundamentalsBundle {
        FundamentalsBundle::default()
            .with_info("trailingPE", 15.0)
            .with_info("profitMargins", 0.20)
            .with_info("returnOnEquity", 0.22)
            .with_info("revenueGrowth", 0.25)
    }

    fn engine(fundamentals: Arc<dyn FundamentalsSource>, news: serde_json::Value) -> WeightRationaleEngine {
        WeightRationaleEngine::new(fundamentals, NewsRetriever::new(Arc::new(StaticNews(news))))
            .with_default_as_of(as_of())
    }

    #[tokio::test]
    async fn test_fundamentals_report_scores_bundle() {
        let engine = engine(Arc::new(StaticFundamentals(strong_bundle())), json!([]));
        let report = engine
            .fundamentals_report(&ReportRequest::new("aapl", 0.05))
            .await
            .unwrap();
        assert_eq!(report.ticker, "AAPL");
        assert_eq!(report.as_of, as_of());
        assert!(report.score >= 2.5);
        assert!(report.rationale_points[0].contains("scale beyond the current 5.00% weight"));
        assert_eq!(report.augmentation, AugmentationStatus::NotRequested);
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_to_filler() {
        let engine = engine(Arc::new(FailingFundamentals), json!([]));
        let report = engine
            .fundamentals_report(&ReportRequest::new("AAPL", 0.05))
            .await
            .unwrap();
        assert!(report.metrics.is_empty());
        assert!(!report.rationale_points.is_empty());
        assert!(report.rationale_points.len() <= 4);
    }

    #[tokio::test]
    async fn test_news_report_without_coverage() {
        let engine = engine(Arc::new(FailingFundamentals), json!([]));
        let report = engine.news_report(&ReportRequest::new("AAPL", 0.05)).await.unwrap();
        assert!(report.articles.is_empty());
        assert_eq!(report.points.len(), 2);
        assert_eq!(report.points[0], report.judgement);
    }

    #[tokio::test]
    async fn test_news_augmentation_replaces_judgement() {
        let canned = Arc::new(Canned {
            reply: "- Trim into strength\n- Recall risk is rising\n\n* Watch deliveries".into(),
            calls: AtomicU32::new(0),
        });
        let layer = AugmentationLayer::new("gpt-4o-mini").with_generator(canned.clone());
        let engine = engine(
            Arc::new(FailingFundamentals),
            json!([{"title": "Tesla expands recall", "date": "2024-03-06"}]),
        )
        .with_augmentation(layer);

        let report = engine
            .news_report(&ReportRequest::new("TSLA", 0.1).augment(None))
            .await
            .unwrap();
        assert_eq!(canned.calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.judgement, "Trim into strength");
        assert_eq!(
            report.points,
            vec!["Trim into strength", "Recall risk is rising", "Watch deliveries"]
        );
        assert!(report.generated_via_augmentation());
    }

    #[tokio::test]
    async fn test_combined_report_uses_both_streams() {
        let engine = engine(
            Arc::new(StaticFundamentals(strong_bundle())),
            json!({"news": [
                {"title": "Apple posts record growth", "providerPublishTime": 1709712000},
                {"title": "Apple faces antitrust lawsuit", "providerPublishTime": 1709798400}
            ]}),
        );
        let report = engine
            .combined_report(&ReportRequest::new("AAPL", 0.05))
            .await
            .unwrap();
        assert!((5..=6).contains(&report.summary_points.len()));
        assert_eq!(report.summary_points[0], report.fundamental_report.rationale_points[0]);
        assert_eq!(report.summary_points[1], report.news_report.points[0]);
        assert_eq!(report.news_report.articles.len(), 2);
        assert_eq!(report.fundamental_report.augmentation, AugmentationStatus::NotRequested);
    }

    #[tokio::test]
    async fn test_combined_augmentation_declined_without_credentials() {
        let engine = engine(Arc::new(StaticFundamentals(strong_bundle())), json!([]))
            .with_augmentation(AugmentationLayer::new("gemini-2.0-flash"));
        let request = ReportRequest::new("AAPL", 0.05).augment(None);

        let report = engine.combined_report(&request).await.unwrap();
        let expected = SynthesisCombiner.combine(
            &report.fundamental_report.rationale_points,
            &report.news_report.points,
            &report.fundamental_report.metrics,
            &report.news_report.articles,
        );
        assert!(!report.generated_via_augmentation());
        assert_eq!(report.summary_points, expected);
        let reason = report.augmentation.declined_reason().unwrap();
        assert!(reason.contains("GOOGLE_API_KEY"));
    }
}
