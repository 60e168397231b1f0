//! `adjust simulate` — feed a simulated herd.
//!
//! Each step measures how satisfied the herd is with the food on offer
//! (`food / (herd * hunger * jitter)`, jitter within ±5%), asks the
//! adjuster for a scale and multiplies the food by it. The adjuster
//! should settle satisfaction around its target within a few steps.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use adjust_core::{AdjustResult, Adjuster, AdjusterOptions, Adjustment};

const HERD_SIZE: f64 = 10.0;
const HUNGER: f64 = 1.0;
/// Deliberately far below what the herd needs.
const INITIAL_FOOD: f64 = 1.0;

/// Aim for full satisfaction, overshoot slightly when hungry, undershoot
/// slightly when overfed.
pub fn default_options() -> AdjusterOptions {
    AdjusterOptions::default()
        .target(1.0)
        .scale_up(1.1)
        .scale_down(0.9)
}

/// The simulated plant.
pub struct Herd {
    size: f64,
    hunger: f64,
    food: f64,
    rng: StdRng,
}

impl Herd {
    pub fn new(rng: StdRng) -> Self {
        Self {
            size: HERD_SIZE,
            hunger: HUNGER,
            food: INITIAL_FOOD,
            rng,
        }
    }

    pub fn food(&self) -> f64 {
        self.food
    }

    /// Today's satisfaction; hunger varies by up to 10% from day to day.
    pub fn satisfaction(&mut self) -> f64 {
        let jitter = (self.rng.random::<f64>() - 0.5) / 10.0 + 1.0;
        self.food / (self.size * self.hunger * jitter)
    }

    /// Measure, adjust, and apply the new scale to the food supply.
    pub fn feed(&mut self, adjuster: &Adjuster) -> AdjustResult<Adjustment> {
        let adjustment = adjuster.compute(Some(self.satisfaction()))?;
        self.food = adjustment.apply(self.food);
        Ok(adjustment)
    }
}

pub async fn simulate(
    options: AdjusterOptions,
    steps: u32,
    seed: Option<u64>,
    interval: Duration,
) -> anyhow::Result<()> {
    let adjuster = Adjuster::from_options(&default_options().merge(options))?;
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut herd = Herd::new(rng);

    for step in 1..=steps {
        let adjustment = herd.feed(&adjuster)?;
        info!(
            step,
            food = herd.food(),
            record = %adjustment.to_record(),
            "Adjusted food by {}% due to satisfaction of {:.2}",
            (adjustment.scale() * 100.0).round(),
            adjustment.measurement()
        );

        if !interval.is_zero() && step < steps {
            tokio::time::sleep(interval).await;
        }
    }

    Ok(())
}
