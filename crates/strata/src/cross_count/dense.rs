use super::{CountingEdge, boundary_edges};
use crate::error::{Error, Result};
use rayon::prelude::*;
use strata_levels::{Direction, NeighborLists, Ranking};

/// Dense matrix kernels for the weighted crossing count of one rank pair.
///
/// With `A` the `north × south` weight matrix, the count is
/// `Σ A[i][j] · Σ_{i' < i, j' > j} A[i'][j']`: a strictly-right suffix sum per row, a
/// strictly-above prefix sum per column, a Hadamard product with `A` and a final reduction.
/// Counts saturate at `u64::MAX`, exactly like [`super::CrossingCounter`].
///
/// The handle owns a dedicated thread pool and the scratch matrices. It must be initialized with
/// [`DenseKernels::init`] before the first count.
#[derive(Debug, Default)]
pub struct DenseKernels {
    threads: Option<usize>,
    state: Option<KernelState>,
}

#[derive(Debug)]
struct KernelState {
    pool: rayon::ThreadPool,
    north: usize,
    south: usize,
    adjacency: Vec<u64>,
    suffix: Vec<u64>,
    /// Column-major (`south × north`), so every column scan owns a contiguous chunk.
    above: Vec<u64>,
    row_totals: Vec<u64>,
    edges: Vec<CountingEdge>,
}

impl DenseKernels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `threads` row workers instead of one per core.
    pub fn with_threads(threads: usize) -> Self {
        Self {
            threads: Some(threads),
            state: None,
        }
    }

    /// Creates and initializes a handle in one step.
    pub fn initialized() -> Result<Self> {
        let mut kernels = Self::new();
        kernels.init()?;
        Ok(kernels)
    }

    /// Starts the kernel thread pool. Calling it again is a no-op.
    pub fn init(&mut self) -> Result<()> {
        if self.state.is_some() {
            return Ok(());
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads.unwrap_or(0))
            .thread_name(|i| format!("strata-dense-{i}"))
            .build()?;
        tracing::debug!(threads = pool.current_num_threads(), "dense kernels initialized");
        self.state = Some(KernelState {
            pool,
            north: 0,
            south: 0,
            adjacency: Vec::new(),
            suffix: Vec::new(),
            above: Vec::new(),
            row_totals: Vec::new(),
            edges: Vec::new(),
        });
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Current `(north, south)` dimensions of the scratch matrices.
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.state.as_ref().map(|s| (s.north, s.south))
    }

    pub fn count(
        &mut self,
        num_north: usize,
        num_south: usize,
        edges: &[CountingEdge],
    ) -> Result<u64> {
        let state = self.state.as_mut().ok_or(Error::KernelsNotInitialized)?;
        if num_north == 0 || num_south == 0 {
            return Ok(0);
        }
        state.load(num_north, num_south, edges);
        Ok(state.run())
    }

    /// Per-boundary counts of the whole graph, laid out like [`super::cross_count`].
    pub fn cross_count(&mut self, ranking: &Ranking, neighbors: &NeighborLists) -> Result<Vec<u64>> {
        let state = self.state.as_mut().ok_or(Error::KernelsNotInitialized)?;
        let mut crossings = vec![0; ranking.rank_count()];
        let mut edges = std::mem::take(&mut state.edges);
        for r in 1..ranking.rank_count() {
            let (num_north, num_south) = (ranking.order(r).len(), ranking.order(r - 1).len());
            if num_north == 0 || num_south == 0 {
                continue;
            }
            boundary_edges(
                ranking.order(r),
                neighbors.rank(Direction::Up, r),
                ranking.position(r - 1),
                &mut edges,
            );
            state.load(num_north, num_south, &edges);
            crossings[r] = state.run();
        }
        state.edges = edges;
        Ok(crossings)
    }
}

impl KernelState {
    fn load(&mut self, north: usize, south: usize, edges: &[CountingEdge]) {
        if (north, south) != (self.north, self.south) {
            tracing::trace!(north, south, "resizing dense crossing matrices");
            let cells = north * south;
            self.adjacency.resize(cells, 0);
            self.suffix.resize(cells, 0);
            self.above.resize(cells, 0);
            self.row_totals.resize(north, 0);
            self.north = north;
            self.south = south;
        }
        self.adjacency.fill(0);
        for e in edges {
            debug_assert!(e.north < north && e.south < south);
            let cell = &mut self.adjacency[e.north * south + e.south];
            *cell = cell.saturating_add(e.weight);
        }
    }

    fn run(&mut self) -> u64 {
        let (north, south) = (self.north, self.south);
        let KernelState {
            pool,
            adjacency,
            suffix,
            above,
            row_totals,
            ..
        } = self;

        pool.install(|| {
            suffix
                .par_chunks_mut(south)
                .zip(adjacency.par_chunks(south))
                .for_each(|(out, row)| {
                    let mut acc: u64 = 0;
                    for (o, &a) in out.iter_mut().zip(row).rev() {
                        *o = acc;
                        acc = acc.saturating_add(a);
                    }
                });

            let suffix = &*suffix;
            above
                .par_chunks_mut(north)
                .enumerate()
                .for_each(|(j, column)| {
                    let mut acc: u64 = 0;
                    for (i, c) in column.iter_mut().enumerate() {
                        *c = acc;
                        acc = acc.saturating_add(suffix[i * south + j]);
                    }
                });

            let above = &*above;
            row_totals
                .par_iter_mut()
                .zip(adjacency.par_chunks(south))
                .enumerate()
                .for_each(|(i, (total, row))| {
                    *total = row
                        .iter()
                        .enumerate()
                        .map(|(j, &a)| a.saturating_mul(above[j * north + i]))
                        .fold(0, u64::saturating_add);
                });

            row_totals.iter().fold(0u64, |acc, &t| acc.saturating_add(t))
        })
    }
}
