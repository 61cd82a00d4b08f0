use crate::resource::registry::ResourceRegistry;
use crate::resource::{normalize_name, GlobMatcher, ResourceId, ResourceType};
use petgraph::graph::NodeIndex;
use petgraph::visit::{Dfs, NodeFiltered};
use std::sync::OnceLock;
use tracing::{debug, trace};

/// Names read reflectively by third-party integrations (Firebase, Crashlytics, ...)
const SERVICE_KEYS: &[&str] = &[
    "google_app_id",
    "gcm_defaultSenderId",
    "default_web_client_id",
    "ga_trackingId",
    "firebase_database_url",
    "google_api_key",
    "google_crash_reporting_api_key",
    "google_storage_bucket",
    "project_id",
    "com_crashlytics_*",
    "com.google.firebase.crashlytics.*",
];

fn service_key_matchers() -> &'static [GlobMatcher] {
    static MATCHERS: OnceLock<Vec<GlobMatcher>> = OnceLock::new();
    MATCHERS.get_or_init(|| {
        SERVICE_KEYS
            .iter()
            .map(|key| GlobMatcher::compile(&normalize_name(key)))
            .collect()
    })
}

/// Whether a (normalized) resource name is a known service key
pub fn is_service_key(name: &str) -> bool {
    service_key_matchers().iter().any(|m| m.matches(name))
}

/// Marks every resource transitively referenced from a root reachable
///
/// Roots are resources already reachable or kept. Discarded resources are
/// never roots and are not traversed into.
pub struct ReachabilityAnalyzer;

impl ReachabilityAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn roots(&self, registry: &ResourceRegistry) -> Vec<ResourceId> {
        registry
            .resources()
            .filter(|(_, r)| (r.is_reachable() || r.is_keep()) && !r.is_discard())
            .map(|(id, _)| id)
            .collect()
    }

    /// Propagate reachability along references; returns the reachable count
    ///
    /// A discarded resource is excluded from the roots even when it is also
    /// kept or referenced from code, and its own references are not followed.
    /// Anything reachable only through a discarded resource stays unreachable.
    pub fn mark_reachable(&self, registry: &mut ResourceRegistry) -> usize {
        let roots = self.roots(registry);
        debug!("Traversing from {} root(s)", roots.len());

        let reached: Vec<NodeIndex> = {
            let graph = registry.graph();
            let filtered = NodeFiltered::from_fn(graph, |n: NodeIndex| !graph[n].is_discard());
            let mut dfs = Dfs::empty(&filtered);
            let mut reached = Vec::new();

            // The DFS discovered set carries across roots, so cycles and shared
            // subgraphs are visited once.
            for root in &roots {
                dfs.move_to(root.0);
                while let Some(node) = dfs.next(&filtered) {
                    reached.push(node);
                }
            }
            reached
        };

        for &node in &reached {
            let id = ResourceRegistry::node(node);
            let resource = registry.get_mut(id);
            if !resource.is_reachable() {
                trace!("Reachable: {}", resource);
                resource.set_reachable(true);
            }
        }

        reached.len()
    }

    /// Whether a resource is reported when unreachable
    fn is_reportable(&self, resource_type: ResourceType, name: &str) -> bool {
        !matches!(resource_type, ResourceType::Attr | ResourceType::Styleable)
            && !is_service_key(name)
    }

    /// Declared resources left unreachable, in declaration order
    pub fn find_unused(&self, registry: &mut ResourceRegistry) -> Vec<ResourceId> {
        self.mark_reachable(registry);

        let unused: Vec<ResourceId> = registry
            .resources()
            .filter(|(_, r)| r.is_declared() && !r.is_reachable())
            .filter(|(_, r)| self.is_reportable(r.resource_type, &r.name))
            .map(|(id, _)| id)
            .collect();

        debug!("{} unused resource(s)", unused.len());
        unused
    }
}

impl Default for ReachabilityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
