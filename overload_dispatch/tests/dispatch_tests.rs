//! Dispatch-tree construction and runtime selection.

mod common;

use common::*;
use overload_dispatch::*;
use pretty_assertions::assert_eq;

// ==================== Specificity at one level ====================

#[test]
fn test_subtype_edge_comes_first() {
    let tree = build(&group("speak", &[&["Animal"], &["Dog"]]));
    let edges: Vec<String> = tree
        .root_node()
        .children()
        .iter()
        .map(|(ty, _)| ty.to_string())
        .collect();
    assert_eq!(edges, vec!["Dog", "Animal"]);
}

#[test]
fn test_dog_and_animal_dispatch() {
    let tree = build(&group("speak", &[&["Animal"], &["Dog"]]));
    assert_eq!(dispatch(&tree, &["Dog"]).as_deref(), Some("api.speak(Dog)"));
    assert_eq!(dispatch(&tree, &["Puppy"]).as_deref(), Some("api.speak(Dog)"));
    assert_eq!(dispatch(&tree, &["Cat"]).as_deref(), Some("api.speak(Animal)"));
    assert_eq!(dispatch(&tree, &["Animal"]).as_deref(), Some("api.speak(Animal)"));
    assert_eq!(dispatch(&tree, &["Int"]), None);
}

#[test]
fn test_declaration_order_does_not_change_edge_order() {
    let tree = build(&group("speak", &[&["Dog"], &["Puppy"], &["Animal"]]));
    let edges: Vec<String> = tree
        .root_node()
        .children()
        .iter()
        .map(|(ty, _)| ty.to_string())
        .collect();
    assert_eq!(edges, vec!["Puppy", "Dog", "Animal"]);
    assert_eq!(dispatch(&tree, &["Puppy"]).as_deref(), Some("api.speak(Puppy)"));
    assert_eq!(dispatch(&tree, &["Cat"]).as_deref(), Some("api.speak(Animal)"));
}

// ==================== Thinning ====================

#[test]
fn test_thinning_keeps_only_more_specific_survivor() {
    let g = group("feed", &[&["Animal", "Int"], &["Dog", "Int"]]);
    let tree = build(&g);

    // Both candidates are legal under the Dog edge and agree on the untested
    // parameter, so only the Dog overload may live there.
    let (edge, under_dog) = &tree.root_node().children()[0];
    assert_eq!(edge, &t("Dog"));
    let node = tree.node(*under_dog);
    assert!(node.is_leaf());
    assert_eq!(
        tree.candidate(node.candidates()[0]).to_string(),
        "api.feed(Dog, Int)"
    );

    // No leaf anywhere holds more than one candidate or the same candidate twice
    // under one edge.
    let leaves = tree.leaves();
    assert_eq!(leaves.len(), 2);
    for leaf in leaves {
        assert_eq!(tree.node(leaf).candidates().len(), 1);
    }
}

#[test]
fn test_thin_on_group_directly() {
    let g = group("feed", &[&["Animal", "Int"], &["Dog", "Int"], &["Dog", "String"]]);
    let ids: Vec<CandidateId> = g.ids().collect();
    let survivors = thin(&zoo(), &g, &ids, &TestedSet::new().with(0));
    let shown: Vec<String> = survivors.iter().map(|id| g.candidate(*id).to_string()).collect();
    assert_eq!(shown, vec!["api.feed(Dog, Int)", "api.feed(Dog, String)"]);
}

// ==================== Dispatch index choice ====================

#[test]
fn test_three_way_tree_never_retests_an_index() {
    let g = group("f", &[&["Int", "Int"], &["Int", "String"], &["String", "Int"]]);
    for policy in [IndexPolicy::SmallestLargestBucket, IndexPolicy::GreatestVariation] {
        let tree = build_with(&g, policy).unwrap();
        // Both indices bucket as {2, 1}: the tie goes to index 0.
        assert_eq!(tree.root_node().dispatch_index(), Some(0));
        for path in paths(&tree) {
            let mut seen = path.clone();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), path.len(), "index retested on {:?}", path);
        }
        assert_eq!(dispatch(&tree, &["Int", "Int"]).as_deref(), Some("api.f(Int, Int)"));
        assert_eq!(dispatch(&tree, &["Int", "String"]).as_deref(), Some("api.f(Int, String)"));
        assert_eq!(dispatch(&tree, &["String", "Int"]).as_deref(), Some("api.f(String, Int)"));
        assert_eq!(dispatch(&tree, &["String", "String"]).as_deref(), Some("api.f(String, Int)"));
    }
}

#[test]
fn test_three_way_tree_dump() {
    let g = group("f", &[&["Int", "Int"], &["Int", "String"], &["String", "Int"]]);
    let tree = build(&g);
    insta::assert_snapshot!(tree.to_string().trim_end(), @r"
f/2
#0
  Int -> #1
    Int -> api.f(Int, Int)
    String -> api.f(Int, String)
  String -> api.f(String, Int)
");
}

#[test]
fn test_tree_serializes_to_json() {
    let g = group("f", &[&["Int", "Int"], &["Int", "String"], &["String", "Int"]]);
    let tree = build(&g);
    let json = serde_json::to_value(&tree).unwrap();
    assert_eq!(json["root"], 0);
    assert_eq!(json["group"]["name"], "f");
    assert_eq!(json["nodes"][0]["branch"]["dispatch_index"], 0);
    assert_eq!(json["nodes"][1]["tested"], serde_json::json!([0]));
    assert_eq!(json["nodes"][1]["edge_type"], "Int");
}

// ==================== Idempotence ====================

#[test]
fn test_rebuild_is_identical() {
    let g = group("f", &[&["Animal", "Int"], &["Dog", "String"], &["Cat", "Int"]]);
    assert_eq!(build(&g), build(&g));
}

#[test]
fn test_overload_set_split_twice() {
    let set = OverloadSet::new(group("f", &[&["Animal"], &["Dog"]]));
    let oracle = zoo();
    let config = DispatchConfig::default();
    let first = set.split(&oracle, &config).unwrap().clone();
    let second = set.split(&oracle, &config).unwrap();
    assert_eq!(&first, second);
    assert!(set.is_split());
}

// ==================== Most-specific selection ====================

#[test]
fn test_most_specific_empty_and_singleton() {
    let g = group("f", &[&["Dog"], &["Animal"]]);
    let ids: Vec<CandidateId> = g.ids().collect();
    assert_eq!(most_specific(&zoo(), &g, &[]), None);
    assert_eq!(most_specific(&zoo(), &g, &ids[1..]), Some(ids[1]));
    assert_eq!(most_specific(&zoo(), &g, &ids), Some(ids[0]));
}

#[test]
fn test_most_specific_incomparable_pair_keeps_first_in_slice() {
    let g = group("f", &[&["Dog", "Animal"], &["Animal", "Dog"]]);
    let ids: Vec<CandidateId> = g.ids().collect();
    let oracle = zoo();
    assert_eq!(most_specific(&oracle, &g, &[ids[0], ids[1]]), Some(ids[0]));
    assert_eq!(most_specific(&oracle, &g, &[ids[1], ids[0]]), Some(ids[1]));
}

#[test]
fn test_ambiguous_call_resolves_to_earlier_declaration() {
    let tree = build(&group("f", &[&["Dog", "Animal"], &["Animal", "Dog"]]));
    assert_eq!(
        dispatch(&tree, &["Dog", "Dog"]).as_deref(),
        Some("api.f(Dog, Animal)")
    );
}

#[test]
fn test_multiple_inheritance_follows_first_matching_edge() {
    // C <: A and C <: B. Leaves do not re-test parameters the path skipped,
    // so a C argument commits to the first applicable edge even when the
    // later sibling is the only candidate applicable to the second argument.
    let oracle = TypeHierarchy::new()
        .with("A", &[])
        .with("B", &[])
        .with("C", &["A", "B"])
        .with("Int", &[])
        .with("String", &[]);
    let g = group("f", &[&["A", "Int"], &["B", "String"]]);
    let tree = TreeBuilder::new(&oracle, &DispatchConfig::default())
        .build(&g)
        .unwrap();

    assert_eq!(tree.root_node().dispatch_index(), Some(0));
    let hit = |args: &[&str]| tree.select(&oracle, &types(args)).map(|c| c.to_string());
    assert_eq!(hit(&["C", "String"]).as_deref(), Some("api.f(A, Int)"));
    assert_eq!(hit(&["C", "Int"]).as_deref(), Some("api.f(A, Int)"));
    assert_eq!(hit(&["B", "String"]).as_deref(), Some("api.f(B, String)"));

    let listing = InstrListing::from_tree(&tree);
    assert_eq!(
        listing.run(&oracle, &types(&["C", "String"])).map(|c| c.to_string()),
        hit(&["C", "String"])
    );
}

// ==================== Hard errors ====================

#[test]
fn test_single_vararg_candidate_aborts() {
    let vararg = Candidate::new(
        "api",
        FunctionDecl::new("log", vec![Param::vararg("xs", t("String"))], t("Int")),
    );
    let g = OverloadGroup::new("log", 1, vec![vararg]).unwrap();
    assert_eq!(g.len(), 1);
    let err = build_with(&g, IndexPolicy::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "unsupported: overloaded varargs in 'log' (parameter 0 of api.log(String...))"
    );
}

#[test]
fn test_vararg_among_overloads_aborts() {
    let vararg = Candidate::new(
        "api",
        FunctionDecl::new(
            "log",
            vec![Param::typed("level", t("Int")), Param::vararg("xs", t("String"))],
            t("Int"),
        ),
    );
    let g = OverloadGroup::new("log", 2, vec![cand("log", &["Int", "Int"]), vararg]).unwrap();
    assert!(matches!(
        build_with(&g, IndexPolicy::GreatestVariation),
        Err(OverloadError::OverloadedVarargs { index: 1, .. })
    ));
}

#[test]
fn test_arity_mismatch_is_rejected_at_ingestion() {
    let err = OverloadGroup::new("f", 1, vec![cand("f", &["Int"]), cand("f", &["Int", "Int"])])
        .unwrap_err();
    assert!(matches!(
        err,
        OverloadError::ArityMismatch {
            expected: 1,
            found: 2,
            ..
        }
    ));
}

// ==================== Properties ====================

mod properties {
    use super::*;
    use proptest::prelude::*;

    /// A chain hierarchy `L0 <: L1 <: ... <: L{n-1}`.
    fn chain(levels: usize) -> TypeHierarchy {
        let mut hierarchy = TypeHierarchy::new();
        for level in 0..levels {
            let name = format!("L{}", level);
            if level + 1 < levels {
                hierarchy.declare(name, [format!("L{}", level + 1)]);
            } else {
                hierarchy.declare(name, Vec::<String>::new());
            }
        }
        hierarchy
    }

    fn level_sig(levels: &[usize]) -> Vec<NominalType> {
        levels.iter().map(|l| NominalType::new(format!("L{}", l))).collect()
    }

    fn decl_of(sig: &[NominalType]) -> Candidate<NominalType> {
        Candidate::new(
            "api",
            FunctionDecl::new(
                "f",
                sig.iter()
                    .enumerate()
                    .map(|(i, ty)| Param::typed(format!("x{}", i), ty.clone()))
                    .collect(),
                t("Int"),
            ),
        )
    }

    /// Pointwise-increasing signatures over a 2-parameter chain: a total order.
    fn chain_signatures() -> impl Strategy<Value = Vec<Vec<usize>>> {
        (
            prop::collection::vec((0usize..=1, 0usize..=1), 1..6),
            0usize..3,
            0usize..3,
        )
            .prop_map(|(steps, a, b)| {
                let mut current = vec![a, b];
                let mut sigs = vec![current.clone()];
                for (da, db) in steps {
                    let (da, db) = if da == 0 && db == 0 { (1, 0) } else { (da, db) };
                    current = vec![current[0] + da, current[1] + db];
                    sigs.push(current.clone());
                }
                sigs
            })
    }

    fn zoo_case() -> impl Strategy<Value = (Vec<Vec<usize>>, Vec<usize>)> {
        (1usize..=3).prop_flat_map(|arity| {
            (
                prop::collection::vec(prop::collection::vec(0..ZOO_TYPES.len(), arity), 1..=6),
                prop::collection::vec(0..ZOO_TYPES.len(), arity),
            )
        })
    }

    fn zoo_group(sigs: &[Vec<usize>]) -> OverloadGroup<NominalType> {
        let arity = sigs[0].len();
        let decls = sigs.iter().map(|sig| {
            let names: Vec<&str> = sig.iter().map(|&i| ZOO_TYPES[i]).collect();
            cand("f", &names)
        });
        OverloadGroup::new("f", arity, decls).unwrap()
    }

    proptest! {
        #[test]
        fn prop_total_order_gives_singleton_leaves(sigs in chain_signatures()) {
            let oracle = chain(16);
            let decls: Vec<Candidate<NominalType>> =
                sigs.iter().map(|s| decl_of(&level_sig(s))).collect();
            let g = OverloadGroup::new("f", 2, decls).unwrap();
            for policy in [IndexPolicy::SmallestLargestBucket, IndexPolicy::GreatestVariation] {
                let config = DispatchConfig::default().with_policy(policy);
                let tree = TreeBuilder::new(&oracle, &config).build(&g).unwrap();
                for leaf in tree.leaves() {
                    prop_assert!(tree.node(leaf).is_leaf());
                }
                // Every candidate is reached by its own signature.
                for candidate in g.candidates() {
                    let sig: Vec<NominalType> =
                        candidate.params().iter().filter_map(|p| p.ty.clone()).collect();
                    prop_assert_eq!(tree.select(&oracle, &sig), Some(candidate));
                }
            }
        }

        #[test]
        fn prop_unique_most_specific_applicable_is_selected(
            (sigs, args) in zoo_case()
        ) {
            let oracle = zoo();
            let g = zoo_group(&sigs);
            let args: Vec<NominalType> = args.iter().map(|&i| t(ZOO_TYPES[i])).collect();

            let applicable: Vec<CandidateId> = g
                .ids()
                .filter(|&id| {
                    g.signature(id)
                        .iter()
                        .zip(&args)
                        .all(|(declared, arg)| oracle.is_subtype_or_equal(arg, declared))
                })
                .collect();
            let best = applicable.iter().copied().find(|&m| {
                applicable.iter().all(|&other| dominates(&oracle, &g, m, other))
            });

            if let Some(best) = best {
                for policy in [IndexPolicy::SmallestLargestBucket, IndexPolicy::GreatestVariation] {
                    let tree = build_with(&g, policy).unwrap();
                    prop_assert_eq!(tree.select(&oracle, &args), Some(g.candidate(best)));
                }
            }
        }

        #[test]
        fn prop_listing_agrees_with_select((sigs, args) in zoo_case()) {
            let oracle = zoo();
            let g = zoo_group(&sigs);
            let args: Vec<NominalType> = args.iter().map(|&i| t(ZOO_TYPES[i])).collect();
            let tree = build(&g);
            let listing = InstrListing::from_tree(&tree);
            prop_assert_eq!(listing.run(&oracle, &args), tree.select(&oracle, &args));
        }

        #[test]
        fn prop_build_is_deterministic((sigs, _args) in zoo_case()) {
            let g = zoo_group(&sigs);
            prop_assert_eq!(build(&g), build(&g));
        }

        #[test]
        fn prop_no_path_retests_an_index((sigs, _args) in zoo_case()) {
            let tree = build(&zoo_group(&sigs));
            for path in paths(&tree) {
                let mut seen = path.clone();
                seen.sort_unstable();
                seen.dedup();
                prop_assert_eq!(seen.len(), path.len());
                prop_assert!(path.len() <= tree.arity());
            }
        }

        #[test]
        fn prop_most_specific_is_never_strictly_dominated(
            (sigs, _args) in zoo_case(),
            reverse in any::<bool>(),
        ) {
            let oracle = zoo();
            let g = zoo_group(&sigs);
            let mut ids: Vec<CandidateId> = g.ids().collect();
            if reverse {
                ids.reverse();
            }
            let chosen = most_specific(&oracle, &g, &ids).unwrap();
            prop_assert!(ids.contains(&chosen));
            for &other in &ids {
                let strictly = dominates(&oracle, &g, other, chosen)
                    && !dominates(&oracle, &g, chosen, other);
                prop_assert!(!strictly, "{} strictly dominates {}", g.candidate(other), g.candidate(chosen));
            }
            // Same answer on a second scan.
            prop_assert_eq!(most_specific(&oracle, &g, &ids), Some(chosen));
        }
    }
}
