use azmapper_core::{AttrType, Attribute, Schema, Validator, RESOURCE_GROUP_NAME};

use crate::nodes::{HEAD_NODE_VM_SIZES, WORKER_NODE_VM_SIZES, ZOOKEEPER_NODE_VM_SIZES};

pub const RESOURCE_TYPE: &str = "azurerm_hdinsight_storm_cluster";

pub const TIERS: &[&str] = &["Standard", "Premium"];

const CLUSTER_NAME: Validator = Validator::Pattern {
    regex: r"^[a-zA-Z0-9][a-zA-Z0-9-]{1,57}[a-zA-Z0-9]$",
    hint: "must be 3 to 59 characters of letters, digits and dashes, starting and ending with a letter or digit",
};

const COMPONENT_VERSION: &[Attribute] = &[
    Attribute::required("storm", AttrType::String).validate(&[Validator::NonEmpty]).force_new(),
];

const GATEWAY: &[Attribute] = &[
    Attribute::required("enabled", AttrType::Bool).force_new(),
    Attribute::required("username", AttrType::String).validate(&[Validator::NonEmpty]).force_new(),
    Attribute::required("password", AttrType::String).validate(&[Validator::NonEmpty]).force_new().sensitive(),
];

const STORAGE_ACCOUNT: &[Attribute] = &[
    Attribute::required("storage_container_id", AttrType::String).validate(&[Validator::HttpUrl]).force_new(),
    Attribute::required("storage_account_key", AttrType::String)
        .validate(&[Validator::NonEmpty])
        .force_new()
        .sensitive(),
    Attribute::required("is_default", AttrType::Bool).force_new(),
];

const USERNAME: Attribute = Attribute::required("username", AttrType::String).validate(&[Validator::NonEmpty]).force_new();
const PASSWORD: Attribute = Attribute::optional("password", AttrType::String).force_new().sensitive();
const SSH_KEYS: Attribute = Attribute::optional("ssh_keys", AttrType::StringSet).validate(&[Validator::NonEmpty]).force_new();
const SUBNET_ID: Attribute = Attribute::optional("subnet_id", AttrType::String).validate(&[Validator::ResourceId]).force_new();
const VIRTUAL_NETWORK_ID: Attribute =
    Attribute::optional("virtual_network_id", AttrType::String).validate(&[Validator::ResourceId]).force_new();

const HEAD_NODE: &[Attribute] = &[
    Attribute::required("vm_size", AttrType::String)
        .validate(&[Validator::OneOfIgnoreCase(HEAD_NODE_VM_SIZES)])
        .force_new(),
    USERNAME,
    PASSWORD,
    SSH_KEYS,
    SUBNET_ID,
    VIRTUAL_NETWORK_ID,
];

const WORKER_NODE: &[Attribute] = &[
    Attribute::required("vm_size", AttrType::String)
        .validate(&[Validator::OneOfIgnoreCase(WORKER_NODE_VM_SIZES)])
        .force_new(),
    USERNAME,
    PASSWORD,
    SSH_KEYS,
    SUBNET_ID,
    VIRTUAL_NETWORK_ID,
    Attribute::optional("min_instance_count", AttrType::Int)
        .validate(&[Validator::IntBetween(1, 9999)])
        .force_new(),
    Attribute::required("target_instance_count", AttrType::Int).validate(&[Validator::IntBetween(1, 9999)]),
];

const ZOOKEEPER_NODE: &[Attribute] = &[
    Attribute::required("vm_size", AttrType::String)
        .validate(&[Validator::OneOfIgnoreCase(ZOOKEEPER_NODE_VM_SIZES)])
        .force_new(),
    USERNAME,
    PASSWORD,
    SSH_KEYS,
    SUBNET_ID,
    VIRTUAL_NETWORK_ID,
];

const ROLES: &[Attribute] = &[
    Attribute::required("head_node", AttrType::Block(HEAD_NODE)),
    Attribute::required("worker_node", AttrType::Block(WORKER_NODE)),
    Attribute::required("zookeeper_node", AttrType::Block(ZOOKEEPER_NODE)),
];

pub const RESOURCE_SCHEMA: Schema = Schema {
    type_name: RESOURCE_TYPE,
    attributes: &[
        Attribute::required("name", AttrType::String).validate(&[CLUSTER_NAME]).force_new(),
        Attribute::required("resource_group_name", AttrType::String)
            .validate(&[RESOURCE_GROUP_NAME])
            .force_new(),
        Attribute::required("location", AttrType::String).validate(&[Validator::NonEmpty]).force_new(),
        Attribute::required("cluster_version", AttrType::String).validate(&[Validator::NonEmpty]).force_new(),
        Attribute::required("tier", AttrType::String).validate(&[Validator::OneOfIgnoreCase(TIERS)]).force_new(),
        Attribute::required("component_version", AttrType::Block(COMPONENT_VERSION)),
        Attribute::required("gateway", AttrType::Block(GATEWAY)),
        Attribute::required(
            "storage_account",
            AttrType::BlockList { attributes: STORAGE_ACCOUNT, max_items: None },
        ),
        Attribute::required("roles", AttrType::Block(ROLES)),
        Attribute::optional("tags", AttrType::StringMap),
        Attribute::computed("https_endpoint", AttrType::String),
        Attribute::computed("ssh_endpoint", AttrType::String),
    ],
};
