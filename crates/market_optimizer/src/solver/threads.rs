#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Threads {
    #[default]
    Single,
    Auto,
    Multi(usize),
}

impl Threads {
    pub fn number_of_threads(&self) -> usize {
        match self {
            Threads::Single => 1,
            Threads::Multi(num) => (*num).max(1),
            Threads::Auto => std::thread::available_parallelism().map_or(1, |n| n.get()),
        }
    }

    /// Builds a rayon pool when more than one thread is requested.
    pub fn build_pool(&self) -> Option<rayon::ThreadPool> {
        let num_threads = self.number_of_threads();
        if num_threads <= 1 {
            return None;
        }

        match rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
        {
            Ok(pool) => Some(pool),
            Err(error) => {
                tracing::warn!("Falling back to a single thread: {}", error);
                None
            }
        }
    }
}

/// `0` means one thread per available core.
impl From<usize> for Threads {
    fn from(threads: usize) -> Self {
        match threads {
            0 => Threads::Auto,
            1 => Threads::Single,
            n => Threads::Multi(n),
        }
    }
}
