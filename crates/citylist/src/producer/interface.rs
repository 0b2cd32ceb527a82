use crate::Result;

/// Outcome of asking a [`Producer`] for its next item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProduceStatus<T> {
    /// A new item was produced.
    Ready {
        /// The produced item.
        item: T,
    },
    /// Every item has been produced. Further calls keep returning this.
    Exhausted,
}

/// A bounded, stepwise producer whose caller controls where cancellation is
/// checked.
///
/// Each call to [`next_with`] either reports [`ProduceStatus::Exhausted`]
/// without invoking `check`, or invokes `check` exactly once *before* paying
/// the cost of the next item. An error from `check` is returned as-is and the
/// producer does not advance.
///
/// The producer never decides on its own when to look at a cancellation
/// signal; delivery strategies pass the check so that every strategy shares
/// the same check-before-produce discipline.
///
/// [`next_with`]: Producer::next_with
pub trait Producer {
    type Item;

    /// Items still to be produced.
    fn remaining(&self) -> usize;

    /// Produces the next item, unless `check` fails first.
    fn next_with<F>(
        &mut self,
        check: F,
    ) -> impl Future<Output = Result<ProduceStatus<Self::Item>>> + Send
    where
        F: FnOnce() -> Result<()> + Send;
}
