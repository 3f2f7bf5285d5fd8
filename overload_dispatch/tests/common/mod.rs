//! Shared helpers for integration tests
#![allow(dead_code)]

use overload_dispatch::*;

/// Single-inheritance hierarchy used throughout the integration tests.
///
/// ```text
/// Any
/// ├── Animal ── Dog ── Puppy
/// │          └─ Cat
/// ├── Number ── Int
/// │          └─ Float
/// └── String
/// ```
pub fn zoo() -> TypeHierarchy {
    TypeHierarchy::new()
        .with("Animal", &[])
        .with("Dog", &["Animal"])
        .with("Puppy", &["Dog"])
        .with("Cat", &["Animal"])
        .with("Number", &[])
        .with("Int", &["Number"])
        .with("Float", &["Number"])
        .with("String", &[])
}

/// Every declared type of [`zoo`], top excluded.
pub const ZOO_TYPES: [&str; 8] = [
    "Animal", "Dog", "Puppy", "Cat", "Number", "Int", "Float", "String",
];

pub fn t(name: &str) -> NominalType {
    NominalType::from(name)
}

pub fn types(names: &[&str]) -> Vec<NominalType> {
    names.iter().map(|n| t(n)).collect()
}

pub fn cand(name: &str, params: &[&str]) -> Candidate<NominalType> {
    Candidate::new(
        "api",
        FunctionDecl::new(
            name,
            params
                .iter()
                .enumerate()
                .map(|(i, ty)| Param::typed(format!("x{}", i), t(ty)))
                .collect(),
            t("Int"),
        ),
    )
}

pub fn group(name: &str, sigs: &[&[&str]]) -> OverloadGroup<NominalType> {
    let arity = sigs.first().map_or(0, |s| s.len());
    OverloadGroup::new(name, arity, sigs.iter().map(|s| cand(name, s)))
        .unwrap_or_else(|e| panic!("invalid test group: {}", e))
}

pub fn build_with(
    group: &OverloadGroup<NominalType>,
    policy: IndexPolicy,
) -> OverloadResult<DispatchTree<NominalType>> {
    let config = DispatchConfig::default().with_policy(policy);
    TreeBuilder::new(&zoo(), &config).build(group)
}

pub fn build(group: &OverloadGroup<NominalType>) -> DispatchTree<NominalType> {
    build_with(group, IndexPolicy::default()).expect("tree build failed")
}

/// Display form of the candidate `select` picks, if any.
pub fn dispatch(tree: &DispatchTree<NominalType>, args: &[&str]) -> Option<String> {
    tree.select(&zoo(), &types(args)).map(|c| c.to_string())
}

/// Dispatch index of every internal node on each root-to-leaf path.
pub fn paths(tree: &DispatchTree<NominalType>) -> Vec<Vec<usize>> {
    tree.leaves()
        .into_iter()
        .map(|leaf| tree.path_to(leaf).into_iter().map(|(i, _)| i).collect())
        .collect()
}
