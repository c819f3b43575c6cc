//! Threshold selection with a guaranteed non-empty fallback.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScoreOrder {
    HigherIsBetter,
    LowerIsBetter,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ThresholdPolicy {
    pub primary: f32,
    pub fallback: Option<f32>,
    pub order: ScoreOrder,
}

impl ThresholdPolicy {
    fn passes(&self, score: f32, threshold: f32) -> bool {
        match self.order {
            ScoreOrder::HigherIsBetter => score >= threshold,
            ScoreOrder::LowerIsBetter => score <= threshold,
        }
    }
}

#[derive(Debug)]
pub(crate) struct Selection<T> {
    pub items: Vec<T>,
    pub threshold: f32,
}

/// Keeps the items passing `primary`, else those passing `fallback`, else the single best item.
///
/// Returns `None` only when `items` is empty. Input order is preserved.
pub(crate) fn select<T, F>(items: Vec<T>, score: F, policy: ThresholdPolicy) -> Option<Selection<T>>
where
    F: Fn(&T) -> f32,
{
    if items.is_empty() {
        return None;
    }

    let thresholds = std::iter::once(policy.primary).chain(policy.fallback);
    for threshold in thresholds {
        if items.iter().any(|item| policy.passes(score(item), threshold)) {
            let items = items
                .into_iter()
                .filter(|item| policy.passes(score(item), threshold))
                .collect();
            return Some(Selection { items, threshold });
        }
    }

    let best = items.into_iter().reduce(|best, item| {
        let better = match policy.order {
            ScoreOrder::HigherIsBetter => score(&item) > score(&best),
            ScoreOrder::LowerIsBetter => score(&item) < score(&best),
        };
        if better { item } else { best }
    })?;
    let threshold = score(&best);
    Some(Selection { items: vec![best], threshold })
}

#[cfg(test)]
mod tests {
    use super::*;

    const COSINE: ThresholdPolicy = ThresholdPolicy {
        primary: 0.7,
        fallback: Some(0.6),
        order: ScoreOrder::HigherIsBetter,
    };

    #[test]
    fn test_primary_threshold() {
        let selection = select(vec![0.9, 0.5, 0.75], |s| *s, COSINE).unwrap();
        assert_eq!(selection.items, vec![0.9, 0.75]);
        assert_eq!(selection.threshold, 0.7);
    }

    #[test]
    fn test_fallback_threshold() {
        let selection = select(vec![0.65, 0.5, 0.61], |s| *s, COSINE).unwrap();
        assert_eq!(selection.items, vec![0.65, 0.61]);
        assert_eq!(selection.threshold, 0.6);
    }

    #[test]
    fn test_best_single_item() {
        let selection = select(vec![0.2, 0.45, 0.1], |s| *s, COSINE).unwrap();
        assert_eq!(selection.items, vec![0.45]);
        assert_eq!(selection.threshold, 0.45);
    }

    #[test]
    fn test_lower_is_better() {
        let policy = ThresholdPolicy {
            primary: 0.5,
            fallback: None,
            order: ScoreOrder::LowerIsBetter,
        };
        let selection = select(vec![0.8, 0.7, 0.9], |s| *s, policy).unwrap();
        assert_eq!(selection.items, vec![0.7]);
        assert_eq!(selection.threshold, 0.7);

        let selection = select(vec![0.3, 0.7, 0.5], |s| *s, policy).unwrap();
        assert_eq!(selection.items, vec![0.3, 0.5]);
    }

    #[test]
    fn test_empty_input() {
        assert!(select(Vec::<f32>::new(), |s| *s, COSINE).is_none());
    }
}
