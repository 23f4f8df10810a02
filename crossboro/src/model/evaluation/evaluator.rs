use crossboro_core::model::{
    geography::{CrossingGeography, GeographyStore},
    leg::LegSynthesizer,
};
use rayon::prelude::*;

use crate::model::route::RouteAggregator;

use super::{
    EvaluationAccumulator, EvaluationConfig, EvaluationError, EvaluationObserver,
    EvaluationSummary, LabeledTrip, TripOutcome,
};

/// streams a dataset of crossing trips through leg synthesis and route
/// aggregation, accumulating the squared error of the predicted durations.
pub struct Evaluator<S: GeographyStore> {
    synthesizer: LegSynthesizer,
    aggregator: RouteAggregator,
    geography: CrossingGeography<S>,
    config: EvaluationConfig,
    observers: Vec<Box<dyn EvaluationObserver>>,
}

impl<S: GeographyStore> Evaluator<S> {
    pub fn new(
        synthesizer: LegSynthesizer,
        aggregator: RouteAggregator,
        geography: CrossingGeography<S>,
        config: EvaluationConfig,
    ) -> Evaluator<S> {
        Evaluator {
            synthesizer,
            aggregator,
            geography,
            config,
            observers: vec![],
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn EvaluationObserver>) -> Evaluator<S> {
        self.observers.push(observer);
        self
    }

    pub fn geography(&self) -> &CrossingGeography<S> {
        &self.geography
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// evaluates with the configured parallelism
    pub fn run(&mut self, trips: &[LabeledTrip]) -> Result<EvaluationSummary, EvaluationError> {
        match self.config.parallelism {
            0 | 1 => self.evaluate(trips),
            n => self.evaluate_parallel(trips, n),
        }
    }

    /// evaluates trips one at a time in dataset order, filling the geography
    /// caches as new superborough pairs are encountered.
    pub fn evaluate(&mut self, trips: &[LabeledTrip]) -> Result<EvaluationSummary, EvaluationError> {
        if trips.is_empty() {
            return Err(EvaluationError::EmptyDataset);
        }
        self.notify(|o| o.on_start(trips.len()))?;
        let mut acc = EvaluationAccumulator::default();
        for (index, trip) in trips.iter().enumerate() {
            let legs = self
                .synthesizer
                .synthesize(&trip.features, &mut self.geography);
            let outcome = TripOutcome::classify(
                index,
                legs,
                &self.aggregator,
                &self.config.unroutable_policy,
            )?;
            self.record(&mut acc, index, trip.duration, &outcome)?;
        }
        self.complete(&acc)
    }

    /// prepares every crossing up front, then scores trips on a thread pool. outcomes
    /// are replayed in dataset order so that checkpoints and the final summary match
    /// [`Evaluator::evaluate`].
    pub fn evaluate_parallel(
        &mut self,
        trips: &[LabeledTrip],
        parallelism: usize,
    ) -> Result<EvaluationSummary, EvaluationError> {
        if trips.is_empty() {
            return Err(EvaluationError::EmptyDataset);
        }
        self.geography.prepare_all()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(parallelism)
            .build()
            .map_err(|e| EvaluationError::ThreadPool(e.to_string()))?;
        log::info!(
            "scoring {} trips with {} threads",
            trips.len(),
            pool.current_num_threads()
        );

        self.notify(|o| o.on_start(trips.len()))?;
        let synthesizer = &self.synthesizer;
        let aggregator = &self.aggregator;
        let geography = &self.geography;
        let policy = &self.config.unroutable_policy;
        let outcomes: Vec<Result<TripOutcome, EvaluationError>> = pool.install(|| {
            trips
                .par_iter()
                .enumerate()
                .map(|(index, trip)| {
                    let legs = synthesizer.synthesize_prepared(&trip.features, geography);
                    TripOutcome::classify(index, legs, aggregator, policy)
                })
                .collect()
        });

        let mut acc = EvaluationAccumulator::default();
        for (index, (trip, outcome)) in trips.iter().zip(outcomes).enumerate() {
            self.record(&mut acc, index, trip.duration, &outcome?)?;
        }
        self.complete(&acc)
    }

    fn record(
        &mut self,
        acc: &mut EvaluationAccumulator,
        index: usize,
        truth: f64,
        outcome: &TripOutcome,
    ) -> Result<(), EvaluationError> {
        acc.record(truth, outcome);
        self.notify(|o| o.on_trip(index, truth, outcome))?;
        if acc.n_trips % self.config.checkpoint_interval() == 0 {
            let checkpoint = acc.checkpoint();
            self.notify(|o| o.on_checkpoint(&checkpoint))?;
        }
        Ok(())
    }

    fn complete(&mut self, acc: &EvaluationAccumulator) -> Result<EvaluationSummary, EvaluationError> {
        let summary = acc.summary();
        self.notify(|o| o.on_complete(&summary))?;
        Ok(summary)
    }

    fn notify<F>(&mut self, mut f: F) -> Result<(), EvaluationError>
    where
        F: FnMut(&mut dyn EvaluationObserver) -> Result<(), EvaluationError>,
    {
        for observer in self.observers.iter_mut() {
            f(observer.as_mut())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{
        duration::{DurationModel, ModelEnsemble},
        evaluation::{Checkpoint, UnroutablePolicy},
    };
    use crossboro_core::model::{
        feature::FeatureVector,
        geography::{Bridge, GeographyError, LocationId, TableGeographyStore},
        layout::{FeatureLayout, LayoutFlags, TripEndpoint, TripFeatures},
        partition::Borough,
    };
    use geo::Coord;
    use rand::prelude::*;
    use std::{
        cell::RefCell,
        collections::{HashMap, HashSet},
        rc::Rc,
        sync::Arc,
    };

    /// weight * features[index] + bias
    struct Linear {
        index: usize,
        weight: f64,
        bias: f64,
    }

    impl DurationModel for Linear {
        fn predict(&self, features: &FeatureVector) -> f64 {
            self.weight * features.get(self.index).unwrap_or_default() as f64 + self.bias
        }

        fn describe(&self) -> String {
            String::from("linear")
        }
    }

    #[derive(Default)]
    struct Recorder {
        checkpoints: Rc<RefCell<Vec<Checkpoint>>>,
    }

    impl EvaluationObserver for Recorder {
        fn on_checkpoint(&mut self, checkpoint: &Checkpoint) -> Result<(), EvaluationError> {
            self.checkpoints.borrow_mut().push(*checkpoint);
            Ok(())
        }
    }

    fn store() -> TableGeographyStore {
        TableGeographyStore::new(
            vec![
                (4, Borough::Manhattan),
                (10, Borough::Manhattan),
                (14, Borough::Brooklyn),
                (20, Borough::Brooklyn),
                (6, Borough::StatenIsland),
            ],
            vec![
                (10, Coord { x: 0.0, y: 0.0 }),
                (20, Coord { x: 5.0, y: 5.0 }),
            ],
            vec![Bridge::new(10, 20)],
        )
    }

    fn layout() -> FeatureLayout {
        FeatureLayout::new(LayoutFlags::new(false, true, true))
    }

    /// leg1 through bridge (10, 20) scores 40 and leg2 scores 50
    fn evaluator<S: GeographyStore>(store: S, config: EvaluationConfig) -> Evaluator<S> {
        let layout = layout();
        let ensemble = ModelEnsemble::new([
            Arc::new(Linear {
                index: layout.dropoff_coordinate,
                weight: 10.0,
                bias: 40.0,
            }),
            Arc::new(Linear {
                index: layout.pickup_coordinate,
                weight: 10.0,
                bias: 0.0,
            }),
            Arc::new(Linear {
                index: 0,
                weight: 0.0,
                bias: 1000.0,
            }),
        ]);
        Evaluator::new(
            LegSynthesizer::new(layout),
            RouteAggregator::new(ensemble),
            CrossingGeography::new(store).unwrap(),
            config,
        )
    }

    fn trip(pickup: (u32, Borough), dropoff: (u32, Borough), duration: f64) -> LabeledTrip {
        let layout = layout();
        let endpoint = |(location_id, borough): (u32, Borough)| TripEndpoint {
            location_id,
            borough,
            coordinate: Coord { x: -73.9, y: 40.7 },
        };
        let features = TripFeatures {
            covariates: vec![1.0; layout.covariates.len()],
            pickup: endpoint(pickup),
            dropoff: endpoint(dropoff),
        }
        .encode(&layout)
        .unwrap();
        LabeledTrip::new(features, duration)
    }

    fn routable(duration: f64) -> LabeledTrip {
        trip((4, Borough::Manhattan), (14, Borough::Brooklyn), duration)
    }

    fn unroutable(duration: f64) -> LabeledTrip {
        trip((6, Borough::StatenIsland), (4, Borough::Manhattan), duration)
    }

    fn config(log_interval: usize, unroutable_policy: UnroutablePolicy) -> EvaluationConfig {
        EvaluationConfig {
            log_interval,
            unroutable_policy,
            ..Default::default()
        }
    }

    #[test]
    fn test_single_bridge_scenario() {
        let mut evaluator = evaluator(store(), EvaluationConfig::default());
        let summary = evaluator.evaluate(&[routable(100.0)]).unwrap();
        // (90 - 100)^2
        assert_eq!(summary.sse, 100.0);
        assert_eq!(summary.rmse, Some(10.0));
        assert_eq!(summary.routed, 1);
    }

    #[test]
    fn test_trip_between_bridge_endpoints() {
        let layout = layout();
        let endpoint = |location_id, borough, x: f64| TripEndpoint {
            location_id,
            borough,
            coordinate: Coord { x, y: x },
        };
        let features = TripFeatures {
            covariates: vec![1.0; layout.covariates.len()],
            pickup: endpoint(10, Borough::Manhattan, 0.0),
            dropoff: endpoint(20, Borough::Brooklyn, 5.0),
        }
        .encode(&layout)
        .unwrap();
        let mut evaluator = evaluator(store(), EvaluationConfig::default());

        // both legs start and end on the bridge endpoints
        let legs = evaluator
            .synthesizer
            .synthesize(&features, &mut evaluator.geography)
            .unwrap();
        assert_eq!(legs.len(), 1);
        let pair = &legs.pairs[0];
        let origin = Some(Coord { x: 0.0, y: 0.0 });
        let far_side = Some(Coord { x: 5.0, y: 5.0 });
        assert_eq!(layout.coordinate_at(&pair.leg1, layout.pickup_coordinate), origin);
        assert_eq!(layout.coordinate_at(&pair.leg1, layout.dropoff_coordinate), origin);
        assert_eq!(layout.coordinate_at(&pair.leg2, layout.pickup_coordinate), far_side);
        assert_eq!(layout.coordinate_at(&pair.leg2, layout.dropoff_coordinate), far_side);

        let summary = evaluator
            .evaluate(&[LabeledTrip::new(features, 100.0)])
            .unwrap();
        // 40 + 50 against 100
        assert_eq!(summary.sse, 100.0);
        assert_eq!(summary.routed, 1);
    }

    #[test]
    fn test_excluded_unroutable_trip_leaves_denominator() {
        let recorder = Recorder::default();
        let checkpoints = recorder.checkpoints.clone();
        let mut evaluator = evaluator(store(), config(1, UnroutablePolicy::Exclude))
            .with_observer(Box::new(recorder));
        let summary = evaluator
            .evaluate(&[unroutable(100.0), routable(100.0)])
            .unwrap();
        assert_eq!(summary.rmse, Some(10.0));
        assert_eq!(summary.unroutable, 1);
        assert_eq!(summary.fallback_scored, 0);
        assert_eq!(
            *checkpoints.borrow(),
            vec![
                Checkpoint {
                    index: 1,
                    rmse: None
                },
                Checkpoint {
                    index: 2,
                    rmse: Some(10.0)
                }
            ]
        );
    }

    #[test]
    fn test_fallback_scores_unroutable_trip() {
        let policy = UnroutablePolicy::Fallback { duration: 130.0 };
        let mut evaluator = evaluator(store(), config(1, policy));
        let summary = evaluator
            .evaluate(&[unroutable(100.0), routable(100.0)])
            .unwrap();
        assert_eq!(summary.fallback_scored, 1);
        assert_eq!(summary.sse, 1000.0);
        assert_eq!(summary.rmse, Some(500.0_f64.sqrt()));
    }

    #[test]
    fn test_checkpoint_interval_defaults_to_ten() {
        let recorder = Recorder::default();
        let checkpoints = recorder.checkpoints.clone();
        let mut evaluator =
            evaluator(store(), EvaluationConfig::default()).with_observer(Box::new(recorder));
        let trips = (0..25).map(|i| routable(80.0 + i as f64)).collect::<Vec<_>>();
        evaluator.evaluate(&trips).unwrap();
        let indices = checkpoints.borrow().iter().map(|c| c.index).collect::<Vec<_>>();
        assert_eq!(indices, vec![10, 20]);
    }

    #[test]
    fn test_skipped_trips_are_counted() {
        let mut evaluator = evaluator(store(), EvaluationConfig::default());
        let same_partition = trip((14, Borough::Brooklyn), (20, Borough::Brooklyn), 50.0);
        let summary = evaluator
            .evaluate(&[same_partition, routable(100.0)])
            .unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.n_trips, 2);
        assert_eq!(summary.rmse, Some(10.0));
    }

    #[test]
    fn test_empty_dataset() {
        let mut evaluator = evaluator(store(), EvaluationConfig::default());
        assert!(matches!(
            evaluator.evaluate(&[]),
            Err(EvaluationError::EmptyDataset)
        ));
        assert!(matches!(
            evaluator.evaluate_parallel(&[], 2),
            Err(EvaluationError::EmptyDataset)
        ));
    }

    #[test]
    fn test_rmse_is_order_independent() {
        let mut trips = (0..40)
            .map(|i| match i % 5 {
                0 => unroutable(70.0),
                _ => routable(60.0 + 3.0 * i as f64),
            })
            .collect::<Vec<_>>();
        let forward = evaluator(store(), EvaluationConfig::default())
            .evaluate(&trips)
            .unwrap();
        trips.shuffle(&mut StdRng::seed_from_u64(10701));
        let shuffled = evaluator(store(), EvaluationConfig::default())
            .evaluate(&trips)
            .unwrap();
        let (a, b) = (forward.rmse.unwrap(), shuffled.rmse.unwrap());
        assert!((a - b).abs() < 1e-9);
        assert_eq!(forward.unroutable, shuffled.unroutable);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let trips = (0..64)
            .map(|i| match i % 7 {
                0 => unroutable(70.0),
                1 => trip((14, Borough::Brooklyn), (20, Borough::Brooklyn), 1.0),
                _ => routable(50.0 + i as f64),
            })
            .collect::<Vec<_>>();
        let cfg = config(5, UnroutablePolicy::Fallback { duration: 75.0 });

        let seq_recorder = Recorder::default();
        let seq_checkpoints = seq_recorder.checkpoints.clone();
        let sequential = evaluator(store(), cfg.clone())
            .with_observer(Box::new(seq_recorder))
            .evaluate(&trips)
            .unwrap();

        let par_recorder = Recorder::default();
        let par_checkpoints = par_recorder.checkpoints.clone();
        let parallel = evaluator(store(), cfg)
            .with_observer(Box::new(par_recorder))
            .evaluate_parallel(&trips, 4)
            .unwrap();

        assert_eq!(sequential, parallel);
        assert_eq!(*seq_checkpoints.borrow(), *par_checkpoints.borrow());
    }

    struct FailingStore;

    impl GeographyStore for FailingStore {
        fn bridges_between(
            &self,
            _a: &[Borough],
            _b: &[Borough],
        ) -> Result<Vec<Bridge>, GeographyError> {
            Err(GeographyError::Query(String::from("connection lost")))
        }

        fn locations_in_borough(
            &self,
            _borough: Borough,
        ) -> Result<HashSet<LocationId>, GeographyError> {
            Ok(HashSet::new())
        }

        fn coordinates(&self) -> Result<HashMap<LocationId, Coord<f64>>, GeographyError> {
            Ok(HashMap::new())
        }
    }

    #[test]
    fn test_store_failure_aborts() {
        let mut evaluator = evaluator(FailingStore, EvaluationConfig::default());
        let result = evaluator.evaluate(&[routable(100.0)]);
        assert!(matches!(result, Err(EvaluationError::Leg { index: 0, .. })));
    }
}
