//! Per-role node definitions of a Storm cluster.

/// What a role accepts: instance count bounds and the VM sizes the service
/// takes for it.
#[derive(Debug, Clone, Copy)]
pub struct NodeDefinition {
    /// Role name on the wire.
    pub role: &'static str,
    /// Attribute name under `roles`.
    pub attribute: &'static str,
    pub can_specify_instance_count: bool,
    pub min_instance_count: i32,
    pub max_instance_count: i32,
    pub fixed_target_instance_count: Option<i32>,
    pub valid_vm_sizes: &'static [&'static str],
}

impl NodeDefinition {
    pub fn accepts_vm_size(&self, vm_size: &str) -> bool {
        self.valid_vm_sizes.iter().any(|s| s.eq_ignore_ascii_case(vm_size))
    }
}

pub(crate) const HEAD_NODE_VM_SIZES: &[&str] = &[
    "Standard_A3",
    "Standard_A4",
    "Standard_A4_v2",
    "Standard_A4m_v2",
    "Standard_A6",
    "Standard_A7",
    "Standard_A8_v2",
    "Standard_A8m_v2",
    "Standard_D12_v2",
    "Standard_D13_v2",
    "Standard_D14_v2",
    "Standard_D3_v2",
    "Standard_D4_v2",
    "Standard_D5_v2",
    "Standard_E16_v3",
    "Standard_E20_v3",
    "Standard_E2_v3",
    "Standard_E32_v3",
    "Standard_E4_v3",
    "Standard_E64_v3",
    "Standard_E64i_v3",
    "Standard_E8_v3",
    "Standard_G2",
    "Standard_G3",
    "Standard_G4",
    "Standard_G5",
];

pub(crate) const WORKER_NODE_VM_SIZES: &[&str] = &[
    "Standard_A3",
    "Standard_A4",
    "Standard_A4_v2",
    "Standard_A4m_v2",
    "A6",
    "A7",
    "Standard_A8_v2",
    "Standard_A8m_v2",
    "Standard_D3_v2",
    "Standard_D4_v2",
    "Standard_D5_v2",
    "Standard_D12_v2",
    "Standard_D13_v2",
    "Standard_D14_v2",
    "Standard_E2_v3",
    "Standard_E4_v3",
    "Standard_E8_v3",
    "Standard_E16_v3",
    "Standard_E20_v3",
    "Standard_E32_v3",
    "Standard_E64_v3",
    "Standard_E64i_v3",
    "Standard_G2",
    "Standard_G3",
    "Standard_G4",
    "Standard_G5",
];

// Fixed by the service for Storm.
pub(crate) const ZOOKEEPER_NODE_VM_SIZES: &[&str] = &["Standard_A4_V2"];

pub const HEAD_NODE: NodeDefinition = NodeDefinition {
    role: "headnode",
    attribute: "head_node",
    can_specify_instance_count: false,
    min_instance_count: 2,
    max_instance_count: 2,
    fixed_target_instance_count: Some(2),
    valid_vm_sizes: HEAD_NODE_VM_SIZES,
};

pub const WORKER_NODE: NodeDefinition = NodeDefinition {
    role: "workernode",
    attribute: "worker_node",
    can_specify_instance_count: true,
    min_instance_count: 1,
    max_instance_count: 9999,
    fixed_target_instance_count: None,
    valid_vm_sizes: WORKER_NODE_VM_SIZES,
};

pub const ZOOKEEPER_NODE: NodeDefinition = NodeDefinition {
    role: "zookeepernode",
    attribute: "zookeeper_node",
    can_specify_instance_count: false,
    min_instance_count: 3,
    max_instance_count: 3,
    fixed_target_instance_count: Some(3),
    valid_vm_sizes: ZOOKEEPER_NODE_VM_SIZES,
};

pub const STORM_ROLES: [NodeDefinition; 3] = [HEAD_NODE, WORKER_NODE, ZOOKEEPER_NODE];
