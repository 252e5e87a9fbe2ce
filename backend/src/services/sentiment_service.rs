use tracing::warn;

use crate::models::{NewsArticle, ScoredArticle, SentimentClass, SentimentCounts};
use crate::services::sentiment_classifier::TextSentimentClassifier;

/// Daily moves beyond this percentage override the text sentiment entirely
pub const PRICE_OVERRIDE_PERCENT: f64 = 5.0;

/// Blend a text-derived sentiment with the day's price movement.
///
/// A price change nudges the class one step in its direction (never straight
/// from negative to positive). A move of more than 5% in either direction then
/// forces positive or negative regardless of the text.
pub fn adjust(
    text_sentiment: SentimentClass,
    price_change: Option<f64>,
    price_change_percent: Option<f64>,
) -> SentimentClass {
    let mut sentiment = text_sentiment;

    if let Some(change) = price_change {
        if change > 0.0 {
            sentiment = match sentiment {
                SentimentClass::Neutral => SentimentClass::Positive,
                SentimentClass::Negative => SentimentClass::Neutral,
                other => other,
            };
        } else if change < 0.0 {
            sentiment = match sentiment {
                SentimentClass::Neutral => SentimentClass::Negative,
                SentimentClass::Positive => SentimentClass::Neutral,
                other => other,
            };
        }
    }

    if let Some(pct) = price_change_percent {
        if pct > PRICE_OVERRIDE_PERCENT {
            sentiment = SentimentClass::Positive;
        } else if pct < -PRICE_OVERRIDE_PERCENT {
            sentiment = SentimentClass::Negative;
        }
    }

    sentiment
}

/// Classify one article and adjust it with the holding's price movement.
/// A classifier failure counts as neutral text.
pub async fn classify_article(
    classifier: &dyn TextSentimentClassifier,
    article: &NewsArticle,
    price_change: Option<f64>,
    price_change_percent: Option<f64>,
) -> SentimentClass {
    let text_sentiment = match classifier.classify(&article.sentiment_text()).await {
        Ok(class) => class,
        Err(e) => {
            warn!("Sentiment classification failed for '{}': {}. Treating as neutral.", article.title, e);
            SentimentClass::Neutral
        }
    };

    adjust(text_sentiment, price_change, price_change_percent)
}

/// Classify every article for a holding, keeping the article order.
pub async fn score_articles(
    classifier: &dyn TextSentimentClassifier,
    symbol: &str,
    sector: &str,
    articles: Vec<NewsArticle>,
    price_change: Option<f64>,
    price_change_percent: Option<f64>,
) -> Vec<ScoredArticle> {
    let mut scored = Vec::with_capacity(articles.len());

    for article in articles {
        let sentiment = classify_article(classifier, &article, price_change, price_change_percent).await;
        scored.push(ScoredArticle {
            article,
            sentiment,
            sentiment_score: sentiment.score(),
            symbol: symbol.to_string(),
            sector: sector.to_string(),
        });
    }

    scored
}

/// Holding-level sentiment folded from its articles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentAggregate {
    pub score: f64,
    pub class: SentimentClass,
    pub counts: SentimentCounts,
}

/// Average the per-article scores and pick the majority class.
///
/// Without articles the score is neutral (0.5) and the class follows the sign
/// of the day's price change.
pub fn aggregate(article_classes: &[SentimentClass], price_change: f64) -> SentimentAggregate {
    if article_classes.is_empty() {
        return SentimentAggregate {
            score: SentimentClass::Neutral.score(),
            class: SentimentClass::from_price_change(price_change),
            counts: SentimentCounts::default(),
        };
    }

    let mut counts = SentimentCounts::default();
    for class in article_classes {
        counts.record(*class);
    }

    let score = article_classes.iter().map(|c| c.score()).sum::<f64>() / article_classes.len() as f64;

    SentimentAggregate {
        score,
        class: counts.mood(),
        counts,
    }
}
