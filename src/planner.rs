// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use crate::{
    optimize, rotate, AddressResolver, Geocoder, Graph, NamePolicy, Navigator, NodeLocator,
    OptimizeOptions, PlanError, Route,
};

/// Additional controls for [RoutePlanner].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlannerOptions {
    pub optimize: OptimizeOptions,

    /// How [RoutePlanner::navigate] names edges with multiple street names.
    pub name_policy: NamePolicy,
}

/// Delivery addresses grouped by the road network node they were resolved to.
///
/// Several addresses may share one node; all of them are kept, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deliveries(BTreeMap<i64, Vec<String>>);

impl Deliveries {
    pub fn insert(&mut self, node_id: i64, address: String) {
        self.0.entry(node_id).or_default().push(address);
    }

    /// Returns all addresses delivered at a node, or an empty slice.
    pub fn addresses(&self, node_id: i64) -> &[String] {
        self.0.get(&node_id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains(&self, node_id: i64) -> bool {
        self.0.contains_key(&node_id)
    }

    /// Returns an iterator over all distinct delivery nodes, in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &[String])> + '_ {
        self.0.iter().map(|(&id, addresses)| (id, addresses.as_slice()))
    }

    /// Returns the number of distinct delivery nodes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the total number of delivery addresses.
    pub fn address_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

/// Result of a planning run.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    /// Closed route starting and ending at the depot.
    pub route: Route,

    pub deliveries: Deliveries,

    /// Node resolved from the first address.
    pub depot: i64,
}

impl Plan {
    /// Creates a fresh [Navigator] over the route.
    pub fn navigate<'a>(&'a self, g: &'a Graph, policy: NamePolicy) -> Navigator<'a> {
        Navigator::new(g, self.route.nodes(), policy)
    }
}

/// RoutePlanner composes address resolution, tour optimization and rotation
/// into a single planning run over a shared, read-only [Graph].
#[derive(Debug, Clone)]
pub struct RoutePlanner<'g, G: Geocoder, L: NodeLocator> {
    g: &'g Graph,
    resolver: AddressResolver<G, L>,
    options: PlannerOptions,
}

impl<'g, G: Geocoder, L: NodeLocator> RoutePlanner<'g, G, L> {
    /// Creates a planner over the provided road network. `locator` must
    /// only return nodes of `g` - usually it is `g` itself or a [KDTree](crate::KDTree) built from it.
    pub fn new(g: &'g Graph, geocoder: G, locator: L, options: PlannerOptions) -> Self {
        Self {
            g,
            resolver: AddressResolver::new(geocoder, locator),
            options,
        }
    }

    pub fn graph(&self) -> &'g Graph {
        self.g
    }

    pub fn options(&self) -> &PlannerOptions {
        &self.options
    }

    /// Plans a closed delivery route over all `addresses`, starting and ending
    /// at the node of the first address.
    ///
    /// Any error of the resolution, optimization or rotation stage aborts the run
    /// and is returned unmodified.
    pub fn plan<S: AsRef<str>>(&self, addresses: &[S]) -> Result<Plan, PlanError> {
        if addresses.is_empty() {
            return Err(PlanError::NoAddresses);
        }

        log::info!("Resolving {} delivery addresses", addresses.len());
        let targets = self.resolver.resolve_all(addresses)?;

        let mut deliveries = Deliveries::default();
        let mut nodes = Vec::with_capacity(targets.len());
        for target in targets {
            nodes.push(target.node.id);
            deliveries.insert(target.node.id, target.address);
        }
        let depot = *nodes.first().ok_or(PlanError::NoAddresses)?;

        log::info!(
            "Optimizing a tour over {} delivery nodes from depot {}",
            deliveries.len(),
            depot
        );
        let tour = optimize(self.g, &nodes, &self.options.optimize)?;

        log::info!("Reordering the tour to start at depot {}", depot);
        let route = rotate(&tour, depot)?;

        Ok(Plan {
            route,
            deliveries,
            depot,
        })
    }

    /// Creates a fresh [Navigator] over a planned route, using [PlannerOptions::name_policy].
    pub fn navigate<'a>(&'a self, plan: &'a Plan) -> Navigator<'a> {
        plan.navigate(self.g, self.options.name_policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{grid, node};
    use crate::{Gazetteer, OptimizeError, ResolutionError, Segment};

    fn gazetteer() -> Gazetteer {
        Gazetteer::from_entries([
            ("Via Verdi 10", 0.0011, 0.0011),
            ("Via Roma 1", 0.0, 0.0001),
            ("Via Roma 2", -0.0001, 0.0),
            ("Via Dante 30", 0.002, 0.002),
            ("Via Roma 30", 0.0, 0.002),
            ("Lontano 1", 0.01, 0.01),
        ])
    }

    fn planner(g: &Graph) -> RoutePlanner<'_, Gazetteer, &Graph> {
        RoutePlanner::new(g, gazetteer(), g, PlannerOptions::default())
    }

    #[test]
    fn plan() {
        let g = grid();
        let plan = planner(&g)
            .plan(&["Via Verdi 10", "Via Roma 1", "Via Dante 30", "Via Roma 30"])
            .unwrap();

        assert_eq!(plan.depot, 5);
        assert_eq!(plan.route.depot(), 5);
        assert_eq!(plan.route.nodes().first(), Some(&5));
        assert_eq!(plan.route.nodes().last(), Some(&5));
        for n in [5, 1, 9, 3] {
            assert!(plan.route.nodes().contains(&n));
            assert!(plan.deliveries.contains(n));
        }
        assert!(plan
            .route
            .legs()
            .all(|(from, to)| g.get_edge(from, to).is_some()));
        assert_eq!(plan.deliveries.addresses(9), &["Via Dante 30".to_string()]);
    }

    #[test]
    fn duplicate_nodes_keep_all_addresses() {
        let g = grid();
        let plan = planner(&g)
            .plan(&["Via Verdi 10", "Via Roma 1", "Via Roma 2"])
            .unwrap();

        assert_eq!(plan.deliveries.len(), 2);
        assert_eq!(plan.deliveries.address_count(), 3);
        assert_eq!(
            plan.deliveries.addresses(1),
            &["Via Roma 1".to_string(), "Via Roma 2".to_string()]
        );
        assert_eq!(plan.deliveries.nodes().collect::<Vec<_>>(), vec![1, 5]);
    }

    #[test]
    fn single_address() {
        let g = grid();
        let p = planner(&g);
        let plan = p.plan(&["Via Dante 30"]).unwrap();

        assert_eq!(plan.depot, 9);
        assert_eq!(plan.route.nodes(), &[9]);

        let segments: Vec<Segment> = p.navigate(&plan).collect::<Result<_, _>>().unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].length, 0.0);
        assert_eq!(segments[0].node_ids, vec![9]);
    }

    #[test]
    fn navigation_covers_route() {
        let g = grid();
        let p = planner(&g);
        let plan = p
            .plan(&["Via Roma 1", "Via Dante 30", "Via Roma 30"])
            .unwrap();

        let segments: Vec<Segment> = p.navigate(&plan).collect::<Result<_, _>>().unwrap();
        assert_eq!(segments.first().map(Segment::start), Some(1));
        assert_eq!(segments.last().map(Segment::end), Some(1));

        let total: f32 = segments.iter().map(|s| s.length).sum();
        let expected: f32 = plan
            .route
            .legs()
            .map(|(from, to)| g.get_edge(from, to).unwrap().length)
            .sum();
        assert!((total - expected).abs() < 1e-3);
    }

    #[test]
    fn no_addresses() {
        let g = grid();
        let addresses: [&str; 0] = [];
        assert!(matches!(
            planner(&g).plan(&addresses),
            Err(PlanError::NoAddresses)
        ));
    }

    #[test]
    fn unknown_address() {
        let g = grid();
        assert!(matches!(
            planner(&g).plan(&["Via Roma 1", "Via Sconosciuta 7"]),
            Err(PlanError::Resolution(ResolutionError::NoMatch(a))) if a == "Via Sconosciuta 7",
        ));
    }

    /// Batch geocoder which loses every result.
    struct Forgetful(Gazetteer);

    impl Geocoder for Forgetful {
        fn geocode(&self, address: &str) -> Result<crate::AddressData, ResolutionError> {
            self.0.geocode(address)
        }

        fn geocode_all<S: AsRef<str>>(
            &self,
            _: &[S],
        ) -> Result<Vec<crate::AddressData>, ResolutionError> {
            Ok(Vec::default())
        }
    }

    #[test]
    fn empty_geocoding_batch() {
        let g = grid();
        let p = RoutePlanner::new(&g, Forgetful(gazetteer()), &g, PlannerOptions::default());

        assert!(matches!(
            p.plan(&["Via Roma 1", "Via Dante 30"]),
            Err(PlanError::Resolution(ResolutionError::IncompleteBatch {
                expected: 2,
                got: 0
            })),
        ));
    }

    #[test]
    fn unreachable_address() {
        let mut g = grid();
        g.set_node(node(10, 0.01, 0.01));

        assert!(matches!(
            planner(&g).plan(&["Via Roma 1", "Lontano 1"]),
            Err(PlanError::Optimize(OptimizeError::UnreachableTarget { from: 1, to: 10 })),
        ));
    }
}
