use crate::{
    buffer::{BufferView, Element},
    geometry::BufferSlot,
    Error,
};

/// A deforming attribute: one [BufferView] per time step.
///
/// A copy of the first step's view is cached for static lookups; [set](Self::set) and
/// [refresh](Self::refresh) keep it in sync.
#[derive(Debug, Clone)]
pub struct TimeSeries<'buf, T: Element> {
    steps: Vec<BufferView<'buf, T>>,
    first: BufferView<'buf, T>,
}

impl<'buf, T: Element> Default for TimeSeries<'buf, T> {
    fn default() -> Self {
        Self::new(1)
    }
}

impl<'buf, T: Element> TimeSeries<'buf, T> {
    /// Construct a series of `num_time_steps` (at least one) empty views.
    pub fn new(num_time_steps: usize) -> Self {
        Self {
            steps: vec![BufferView::empty(); num_time_steps.max(1)],
            first: BufferView::empty(),
        }
    }

    /// The number of time steps, at least one.
    #[inline(always)]
    pub fn num_time_steps(&self) -> usize {
        self.steps.len()
    }

    /// The number of elements per time step.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.first.len()
    }

    /// Whether no data has been provided for this attribute.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.first.is_empty()
    }

    /// The cached view of the first time step.
    #[inline(always)]
    pub fn first(&self) -> &BufferView<'buf, T> {
        &self.first
    }

    /// The view of the `itime`th time step.
    ///
    /// # Panics
    ///
    /// * `itime >= self.num_time_steps()`
    #[inline(always)]
    pub fn step(&self, itime: usize) -> &BufferView<'buf, T> {
        &self.steps[itime]
    }

    /// The `i`th element of the `itime`th time step.
    #[inline(always)]
    pub fn get(&self, i: usize, itime: usize) -> T {
        self.steps[itime].get(i)
    }

    /// Replace the view of the `itime`th time step.
    pub fn set(&mut self, itime: usize, view: BufferView<'buf, T>) -> Result<(), Error> {
        let num_time_steps = self.steps.len();
        let step = self
            .steps
            .get_mut(itime)
            .ok_or(Error::TimeStepOutOfRange {
                itime,
                num_time_steps,
            })?;
        *step = view;
        self.refresh();
        Ok(())
    }

    /// Change the number of time steps, keeping the views of steps which remain.
    pub fn resize(&mut self, num_time_steps: usize) {
        self.steps.resize(num_time_steps.max(1), BufferView::empty());
        self.refresh();
    }

    /// Re-cache the first time step's view after its buffer changed.
    ///
    /// Must not run concurrently with readers of this series; `&mut self` guarantees as much.
    #[inline]
    pub fn refresh(&mut self) {
        self.first = self.steps[0];
    }

    /// Iterate through the view of every time step, in order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &BufferView<'buf, T>> + '_ {
        self.steps.iter()
    }

    /// Ensure every time step holds the same number of elements as the first.
    pub fn check_counts(&self, slot: BufferSlot) -> Result<(), Error> {
        let expected = self.steps[0].len();
        match self
            .steps
            .iter()
            .enumerate()
            .find(|(_, view)| view.len() != expected)
        {
            Some((itime, view)) => Err(Error::MismatchedElementCount {
                slot,
                itime,
                expected,
                actual: view.len(),
            }),
            None => Ok(()),
        }
    }
}
