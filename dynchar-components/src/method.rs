//! Default kernels for the flows of a static LCIA method.
//!
//! Flows are matched by name to the gases with dedicated kernels. Other flows
//! get a generic kernel if their CAS number is found in a
//! [`DecayMultiplierTable`]; everything else stays uncharacterized.
//!
//! "Methane, non-fossil" is not matched because its static characterization
//! factor differs from that of fossil methane.

use crate::kernels::Kernel;
use dynchar_core::config::Metric;
use dynchar_core::data::{BiosphereDatabase, BiosphereNode, DecayMultiplierTable, LciaMethod};
use dynchar_core::errors::DynCharResult;
use dynchar_core::timeseries::FlowId;
use log::{debug, info};
use std::collections::BTreeMap;

/// Kernel assigned to each characterized flow
pub type FlowKernelMap = BTreeMap<FlowId, Kernel>;

/// Static kernel for a biosphere flow, if one applies
pub fn kernel_for_node(node: &BiosphereNode, decay_table: &DecayMultiplierTable) -> Option<Kernel> {
    let name = node.name.to_lowercase();

    if name.contains("carbon dioxide") {
        // Flows from the soil compartment are uptake
        if node.categories.iter().any(|category| category == "soil") {
            Some(Kernel::Co2Uptake)
        } else {
            Some(Kernel::Co2)
        }
    } else if name.contains("methane, fossil") || name.contains("methane, from soil or biomass stock") {
        Some(Kernel::Ch4)
    } else if name.contains("dinitrogen monoxide") {
        Some(Kernel::N2o)
    } else if name.contains("carbon monoxide") {
        Some(Kernel::Co)
    } else {
        node.cas_number
            .as_deref()
            .and_then(|cas| decay_table.get(cas))
            .map(Kernel::generic)
    }
}

/// Adapt a static kernel to `metric`.
///
/// Scenario-based metrics use the prospective counterpart where one exists.
/// Other kernels are kept for those metrics only when `fallback_to_ipcc` is set.
pub fn kernel_for_metric(kernel: Kernel, metric: Metric, fallback_to_ipcc: bool) -> Option<Kernel> {
    if !metric.is_prospective() {
        return Some(kernel);
    }
    match kernel.prospective_counterpart() {
        Some(prospective) => Some(prospective),
        None if fallback_to_ipcc => Some(kernel),
        None => None,
    }
}

/// Build the kernel map for all flows characterized by `method`.
pub fn default_flow_kernels(
    database: &dyn BiosphereDatabase,
    method: &LciaMethod,
    decay_table: &DecayMultiplierTable,
    metric: Metric,
    fallback_to_ipcc: bool,
) -> DynCharResult<FlowKernelMap> {
    let mut kernels = FlowKernelMap::new();

    for identifier in database.method_flows(method)? {
        let node = database.node(&identifier)?;
        let Some(kernel) = kernel_for_node(&node, decay_table) else {
            debug!("No kernel for flow {} ({})", node.id, node.name);
            continue;
        };
        match kernel_for_metric(kernel, metric, fallback_to_ipcc) {
            Some(kernel) => {
                kernels.insert(node.id, kernel);
            }
            None => debug!(
                "Dropping flow {} ({}): no scenario data for {}",
                node.id, node.name, metric
            ),
        }
    }

    info!(
        "Using default kernels for {} flows of method {}",
        kernels.len(),
        method
    );
    Ok(kernels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::KernelKind;
    use dynchar_core::data::{FlowIdentifier, InMemoryBiosphere};
    use dynchar_core::errors::DynCharError;

    fn node(id: FlowId, name: &str, categories: &[&str], cas: Option<&str>) -> BiosphereNode {
        BiosphereNode {
            id,
            database: "biosphere3".to_string(),
            code: format!("code-{}", id),
            name: name.to_string(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            cas_number: cas.map(|c| c.to_string()),
        }
    }

    fn database() -> (InMemoryBiosphere, LciaMethod) {
        let method = LciaMethod::new(&["EF v3.1", "climate change", "global warming potential (GWP100)"]);
        let mut db = InMemoryBiosphere::new();
        db.with_node(node(1, "Carbon dioxide, fossil", &["air"], Some("124-38-9")))
            .with_node(node(2, "Carbon dioxide, to soil or biomass stock", &["soil"], None))
            .with_node(node(3, "Methane, fossil", &["air"], Some("74-82-8")))
            .with_node(node(4, "Dinitrogen monoxide", &["air"], Some("10024-97-2")))
            .with_node(node(5, "Carbon monoxide, fossil", &["air"], Some("630-08-0")))
            .with_node(node(6, "Methane, dichloro-", &["air"], Some("75-09-2")))
            .with_node(node(7, "Methane, non-fossil", &["air"], Some("74-82-8x")))
            .with_method(
                &method,
                vec![
                    FlowIdentifier::Id(1),
                    FlowIdentifier::Id(2),
                    FlowIdentifier::Id(3),
                    FlowIdentifier::Key {
                        database: "biosphere3".to_string(),
                        code: "code-4".to_string(),
                    },
                    FlowIdentifier::Id(5),
                    FlowIdentifier::Id(6),
                    FlowIdentifier::Id(7),
                ],
            );
        (db, method)
    }

    fn decay_table() -> DecayMultiplierTable {
        let mut table = DecayMultiplierTable::new();
        table.insert("75-09-2", vec![0.0, 1e-13, 1.5e-13]);
        table
    }

    #[test]
    fn name_heuristics() {
        let table = decay_table();
        let kinds: Vec<Option<KernelKind>> = [
            node(1, "Carbon dioxide, fossil", &["air"], None),
            node(2, "Carbon dioxide, to soil or biomass stock", &["soil"], None),
            node(3, "Methane, from soil or biomass stock", &["air"], None),
            node(4, "Dinitrogen monoxide", &["air"], None),
            node(5, "Carbon monoxide, non-fossil", &["air"], None),
            node(6, "Methane, dichloro-", &["air"], Some("75-09-2")),
            node(7, "Sulfur hexafluoride", &["air"], Some("2551-62-4")),
        ]
        .iter()
        .map(|n| kernel_for_node(n, &table).map(|k| k.kind()))
        .collect();

        assert_eq!(
            kinds,
            vec![
                Some(KernelKind::Co2),
                Some(KernelKind::Co2Uptake),
                Some(KernelKind::Ch4),
                Some(KernelKind::N2o),
                Some(KernelKind::Co),
                Some(KernelKind::Generic),
                None,
            ]
        );
    }

    #[test]
    fn default_map_for_static_metric() {
        let (db, method) = database();
        let kernels =
            default_flow_kernels(&db, &method, &decay_table(), Metric::RadiativeForcing, false).unwrap();

        assert_eq!(kernels.len(), 6);
        assert_eq!(kernels[&2], Kernel::Co2Uptake);
        assert_eq!(kernels[&4], Kernel::N2o);
        assert_eq!(kernels[&6].kind(), KernelKind::Generic);
        assert!(!kernels.contains_key(&7));
    }

    #[test]
    fn default_map_for_prospective_metric() {
        let (db, method) = database();
        let table = decay_table();

        let kernels = default_flow_kernels(&db, &method, &table, Metric::Pgwp, false).unwrap();
        assert_eq!(kernels.len(), 4);
        assert_eq!(kernels[&1], Kernel::ProspectiveCo2);
        assert_eq!(kernels[&2], Kernel::ProspectiveCo2Uptake);
        assert_eq!(kernels[&3], Kernel::ProspectiveCh4);
        assert_eq!(kernels[&4], Kernel::ProspectiveN2o);

        let with_fallback = default_flow_kernels(&db, &method, &table, Metric::Pgtp, true).unwrap();
        assert_eq!(with_fallback.len(), 6);
        assert_eq!(with_fallback[&5], Kernel::Co);
    }

    #[test]
    fn unresolvable_flow_is_unknown_object() {
        let (mut db, method) = database();
        db.with_method(&method, vec![FlowIdentifier::Id(99)]);
        let err = default_flow_kernels(&db, &method, &decay_table(), Metric::Gwp, false).unwrap_err();
        assert!(matches!(err, DynCharError::UnknownObject(_)));
    }
}
