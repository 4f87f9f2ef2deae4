//! Integration tests for single-level navigation
//!
//! Covers planning decisions, lifecycle ordering, redirects, unknown routes
//! and the events published around a navigation.

mod common;

use common::*;
use navigator_pipeline::*;
use std::sync::Arc;

fn user_routes(config: &mut RouterConfiguration) {
    config
        .map(RouteConfig::new("").name("home").module_id("home").nav(true))
        .map(
            RouteConfig::new("users/:id")
                .name("user")
                .module_id("users/detail"),
        );
}

// ============================================================================
// Basic navigation
// ============================================================================

#[test]
fn test_first_navigation_replaces_default_view_port() {
    let harness = Harness::new(|config, _, _| user_routes(config));

    let result = harness.load("/users/42");

    assert_completed(&result);
    let current = harness.app.current_instruction().unwrap();
    assert_eq!(current.fragment, "/users/42");
    assert_eq!(current.params.get("id"), Some("42"));
    assert_eq!(current.config.name.as_deref(), Some("user"));

    let view_port = current.view_port_instruction(DEFAULT_VIEW_PORT).unwrap();
    assert_eq!(view_port.strategy, ActivationStrategy::Replace);
    assert_eq!(view_port.component.module_id(), "users/detail");
    assert!(current.config.nav_model().unwrap().is_active());

    let home = &harness.app.navigation()[0];
    assert!(!home.is_active());
    assert_eq!(harness.loader.loads(), vec!["users/detail"]);
    assert_eq!(
        harness.log.entries(),
        vec!["process:users/detail", "swap:users/detail"]
    );
}

#[test]
fn test_successful_navigation_events() {
    let harness = Harness::new(|config, _, _| user_routes(config));

    harness.load("/users/1");

    assert_eq!(
        harness.events.entries(),
        vec![
            "router:navigation:processing",
            "router:navigation:success",
            "router:navigation:complete",
        ]
    );
    assert!(!harness.app.is_navigating());
}

#[test]
fn test_query_string_reaches_lifecycle_args() {
    let harness = Harness::new(|config, _, _| user_routes(config));

    assert_completed(&harness.load("/users/7?tab=posts&id=99"));

    let current = harness.app.current_instruction().unwrap();
    assert_eq!(current.query_string, "tab=posts&id=99");
    assert_eq!(current.query_params.get("tab"), Some("posts"));

    let args = current.lifecycle_args();
    assert_eq!(args.params.get("tab"), Some("posts"));
    // route parameters win over query parameters of the same name
    assert_eq!(args.params.get("id"), Some("7"));
}

#[test]
fn test_activate_loads_history_fragment() {
    let harness = Harness::new(|config, _, _| user_routes(config));
    assert!(harness
        .history
        .navigate("#/users/5", &NavigationOptions::new()));

    let result = pollster::block_on(harness.app.activate()).unwrap();

    assert_completed(&result);
    assert!(harness.history.is_active());
    assert_eq!(harness.current_fragment().as_deref(), Some("/users/5"));
}

// ============================================================================
// Planning
// ============================================================================

#[test]
fn test_parameter_change_invokes_lifecycle_on_same_instance() {
    let harness = Harness::new(|config, loader, log| {
        user_routes(config);
        let log = log.clone();
        loader.module("users/detail", move || recording_view_model("detail", &log));
    });

    assert_completed(&harness.load("/users/42"));
    let first = harness.current_component();
    harness.log.clear();

    assert_completed(&harness.load("/users/43"));

    let current = harness.app.current_instruction().unwrap();
    let view_port = current.view_port_instruction(DEFAULT_VIEW_PORT).unwrap();
    assert_eq!(view_port.strategy, ActivationStrategy::InvokeLifecycle);
    assert!(Arc::ptr_eq(&first, &view_port.component));
    assert_eq!(view_port.lifecycle_args.params.get("id"), Some("43"));
    assert_eq!(harness.loader.loads(), vec!["users/detail"]);
    assert_eq!(
        harness.log.entries(),
        vec![
            "can_deactivate:detail",
            "can_activate:detail",
            "deactivate:detail",
            "activate:detail",
        ]
    );
}

#[test]
fn test_committed_tree_drops_plans_and_previous_links() {
    let harness = Harness::new(|config, _, _| user_routes(config));

    assert_completed(&harness.load("/users/1"));
    assert_completed(&harness.load("/users/2"));

    let tree = harness.app.current_tree().unwrap();
    assert!(tree.previous_tree().is_none());
    for (_, instruction) in tree.iter() {
        assert!(instruction.plan().is_none());
        assert!(instruction.previous().is_none());
    }
    assert_eq!(tree.root().params.get("id"), Some("2"));
}

#[test]
fn test_canceled_navigation_leaves_committed_state() {
    let harness = Harness::new(|config, loader, _| {
        user_routes(config);
        loader.module("users/detail", || {
            ViewModel::new("detail").can_activate(|args: &LifecycleArgs| {
                HookResult::from(args.params.get("id") != Some("43"))
            })
        });
    });
    assert_completed(&harness.load("/users/42"));
    let before = harness.app.current_tree().unwrap();
    let component = harness.current_component();

    assert_canceled(&harness.load("/users/43"));

    let after = harness.app.current_tree().unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert!(after.root().plan().is_none());
    assert!(after.previous_tree().is_none());
    let current = harness.app.current_instruction().unwrap();
    assert_eq!(current.params.get("id"), Some("42"));
    let view_port = current.view_port_instruction(DEFAULT_VIEW_PORT).unwrap();
    assert_eq!(view_port.strategy, ActivationStrategy::Replace);
    assert!(Arc::ptr_eq(&component, &view_port.component));
    assert!(current.config.nav_model().unwrap().is_active());
    assert_eq!(harness.history.fragment(), "/users/42");
}

#[test]
fn test_same_url_is_no_change() {
    let harness = Harness::new(|config, loader, log| {
        user_routes(config);
        let log = log.clone();
        loader.module("users/detail", move || recording_view_model("detail", &log));
    });

    assert_completed(&harness.load("/users/42"));
    harness.log.clear();

    assert_completed(&harness.load("/users/42"));

    let current = harness.app.current_instruction().unwrap();
    let view_port = current.view_port_instruction(DEFAULT_VIEW_PORT).unwrap();
    assert_eq!(view_port.strategy, ActivationStrategy::NoChange);
    assert!(harness.log.entries().is_empty());
    assert_eq!(harness.loader.loads().len(), 1);
}

#[test]
fn test_query_change_ignored_unless_compared() {
    let harness = Harness::new(|config, _, _| user_routes(config));
    harness.load("/users/1?page=1");
    harness.load("/users/1?page=2");
    let current = harness.app.current_instruction().unwrap();
    assert_eq!(
        current.view_port_instruction(DEFAULT_VIEW_PORT).unwrap().strategy,
        ActivationStrategy::NoChange
    );

    let harness = Harness::new(|config, _, _| {
        user_routes(config);
        config.options(RouterOptions::new().compare_query_params(true));
    });
    harness.load("/users/1?page=1");
    harness.load("/users/1?page=2");
    let current = harness.app.current_instruction().unwrap();
    assert_eq!(
        current.view_port_instruction(DEFAULT_VIEW_PORT).unwrap().strategy,
        ActivationStrategy::InvokeLifecycle
    );
}

#[test]
fn test_route_activation_strategy_overrides_parameter_comparison() {
    let harness = Harness::new(|config, loader, log| {
        config.map(
            RouteConfig::new("users/:id")
                .module_id("users/detail")
                .activation_strategy(ActivationStrategy::NoChange),
        );
        let log = log.clone();
        loader.module("users/detail", move || recording_view_model("detail", &log));
    });

    harness.load("/users/1");
    let first = harness.current_component();
    harness.log.clear();
    assert_completed(&harness.load("/users/2"));

    let current = harness.app.current_instruction().unwrap();
    let view_port = current.view_port_instruction(DEFAULT_VIEW_PORT).unwrap();
    assert_eq!(view_port.strategy, ActivationStrategy::NoChange);
    assert!(Arc::ptr_eq(&first, &view_port.component));
    assert_eq!(current.params.get("id"), Some("2"));
    assert!(harness.log.entries().is_empty());
}

#[test]
fn test_component_strategy_hook_wins_over_route_strategy() {
    let harness = Harness::new(|config, loader, _| {
        config.map(
            RouteConfig::new("users/:id")
                .module_id("users/detail")
                .activation_strategy(ActivationStrategy::NoChange),
        );
        loader.module("users/detail", || {
            ViewModel::new("detail")
                .determine_activation_strategy(|_: &LifecycleArgs| ActivationStrategy::Replace)
        });
    });

    harness.load("/users/1");
    let first = harness.current_component();
    harness.load("/users/2");

    let second = harness.current_component();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(harness.loader.loads(), vec!["users/detail", "users/detail"]);
}

#[test]
fn test_module_change_forces_replace() {
    let harness = Harness::new(|config, loader, log| {
        config
            .map(RouteConfig::new("a").module_id("page-a"))
            .map(RouteConfig::new("b").module_id("page-b"));
        let log = log.clone();
        loader.module("page-a", move || {
            let log = log.clone();
            ViewModel::new("page-a").determine_activation_strategy(move |_: &LifecycleArgs| {
                log.push("determine:page-a");
                ActivationStrategy::NoChange
            })
        });
    });

    harness.load("/a");
    assert_completed(&harness.load("/b"));

    assert!(harness.log.filtered("determine").is_empty());
    assert_eq!(harness.loader.loads(), vec!["page-a", "page-b"]);
    let current = harness.app.current_instruction().unwrap();
    assert_eq!(
        current.view_port_instruction(DEFAULT_VIEW_PORT).unwrap().strategy,
        ActivationStrategy::Replace
    );
}

// ============================================================================
// Lifecycle gates
// ============================================================================

#[test]
fn test_can_deactivate_false_keeps_current_location() {
    let harness = Harness::new(|config, loader, _| {
        user_routes(config);
        loader.module("home", || {
            ViewModel::new("home").can_deactivate(|| HookResult::from(false))
        });
    });

    assert_completed(&harness.load("/"));
    let result = harness.load("/users/1");

    assert_canceled(&result);
    assert_eq!(result.output, PipelineOutput::Bool(false));
    assert_eq!(harness.current_fragment().as_deref(), Some("/"));
    assert_eq!(harness.history.fragment(), "/");
    assert_eq!(
        harness.events.filtered("router:navigation:canceled").len(),
        1
    );
}

#[test]
fn test_hook_error_cancels_with_error_event() {
    let harness = Harness::new(|config, loader, _| {
        user_routes(config);
        loader.module("users/detail", || {
            ViewModel::new("detail")
                .can_activate(|_: &LifecycleArgs| HookResult::error(RouterError::hook("boom")))
        });
    });

    harness.load("/");
    harness.events.clear();
    let result = harness.load("/users/1");

    assert_canceled(&result);
    assert_eq!(
        result.output.as_error(),
        Some(&RouterError::hook("boom"))
    );
    assert_eq!(
        harness.events.entries(),
        vec![
            "router:navigation:processing",
            "router:navigation:error",
            "router:navigation:complete",
        ]
    );
    assert_eq!(harness.current_fragment().as_deref(), Some("/"));
}

#[test]
fn test_pending_hook_answer_is_awaited() {
    let harness = Harness::new(|config, loader, _| {
        user_routes(config);
        loader.module("users/detail", || {
            ViewModel::new("detail").can_activate(|args: &LifecycleArgs| {
                let allowed = args.params.get("id") != Some("0");
                HookResult::pending(async move { Ok(HookOutput::Bool(allowed)) })
            })
        });
    });

    assert_completed(&harness.load("/users/1"));
    assert_canceled(&harness.load("/users/0"));
    assert_eq!(harness.current_fragment().as_deref(), Some("/users/1"));
}

#[test]
fn test_stream_hook_uses_first_value() {
    let harness = Harness::new(|config, loader, _| {
        user_routes(config);
        loader.module("users/detail", || {
            ViewModel::new("detail").can_activate(|_: &LifecycleArgs| {
                HookResult::stream(futures::stream::iter(vec![
                    Ok(HookOutput::Bool(false)),
                    Ok(HookOutput::Bool(true)),
                ]))
            })
        });
    });

    assert_canceled(&harness.load("/users/1"));
}

#[test]
fn test_unresolved_hook_stalls_the_queue() {
    let harness = Harness::new(|config, loader, _| {
        user_routes(config);
        config.map(RouteConfig::new("stuck").module_id("stuck"));
        loader.module("stuck", || {
            ViewModel::new("stuck").can_activate(|_: &LifecycleArgs| {
                HookResult::pending(futures::future::pending())
            })
        });
    });

    pollster::block_on(async {
        let mut stuck = std::pin::pin!(harness.app.load_url("/stuck"));
        assert!(futures::poll!(stuck.as_mut()).is_pending());
        assert!(harness.app.is_navigating());

        let mut next = std::pin::pin!(harness.app.load_url("/users/1"));
        assert!(futures::poll!(next.as_mut()).is_pending());
    });

    assert!(harness.app.current_instruction().is_none());
    assert_eq!(harness.loader.loads(), vec!["stuck"]);
}

// ============================================================================
// Redirects
// ============================================================================

#[test]
fn test_redirect_route_carries_params_and_query() {
    let harness = Harness::new(|config, _, _| {
        user_routes(config);
        config.map(RouteConfig::new("old/:id").redirect("users/:id"));
    });

    let result = harness.load("/old/7?tab=posts");

    assert_completed(&result);
    let current = harness.app.current_instruction().unwrap();
    assert_eq!(current.fragment, "/users/7");
    assert_eq!(current.params.get("id"), Some("7"));
    assert_eq!(current.query_params.get("tab"), Some("posts"));
    assert_eq!(harness.history.fragment(), "/users/7?tab=posts");
    assert_eq!(
        harness.events.entries(),
        vec![
            "router:navigation:processing",
            "router:navigation:child:complete",
            "router:navigation:success",
            "router:navigation:complete",
        ]
    );
}

#[test]
fn test_can_activate_redirect_to_route() {
    let harness = Harness::new(|config, loader, _| {
        user_routes(config);
        config.map(RouteConfig::new("me").module_id("me"));
        loader.module("me", || {
            ViewModel::new("me").can_activate(|_: &LifecycleArgs| {
                NavigationCommand::redirect_to_route("user", RouteParams::from_pairs([("id", "5")]))
                    .into()
            })
        });
    });

    assert_completed(&harness.load("/me"));
    assert_eq!(harness.current_fragment().as_deref(), Some("/users/5"));
    assert_eq!(harness.history.fragment(), "/users/5");
}

#[test]
fn test_redirect_loop_stops_after_max_instruction_count() {
    let counter = Log::new();
    let harness = Harness::new(|config, loader, _| {
        user_routes(config);
        config
            .map(RouteConfig::new("loop").module_id("loop"))
            .options(RouterOptions::new().max_instruction_count(4));
        let counter = counter.clone();
        loader.module("loop", move || {
            let counter = counter.clone();
            ViewModel::new("loop").can_activate(move |_: &LifecycleArgs| {
                counter.push("run");
                NavigationCommand::redirect("/loop").into()
            })
        });
    });

    assert_completed(&harness.load("/"));
    let result = harness.load("/loop");

    assert_canceled(&result);
    assert_eq!(counter.entries().len(), 4);
    assert_eq!(harness.current_fragment().as_deref(), Some("/"));
    assert_eq!(harness.history.fragment(), "/");
    assert!(!harness.app.is_navigating());
}

// ============================================================================
// Failures and fallbacks
// ============================================================================

#[test]
fn test_unknown_url_is_not_found() {
    let harness = Harness::new(|config, _, _| user_routes(config));
    harness.load("/users/1");

    let error = pollster::block_on(harness.app.load_url("/missing")).unwrap_err();

    assert_eq!(
        error,
        RouterError::RouteNotFound {
            url: "/missing".to_string()
        }
    );
    assert!(!harness.app.is_navigating());
    assert_eq!(harness.current_fragment().as_deref(), Some("/users/1"));
}

#[test]
fn test_unknown_routes_map_to_module() {
    let harness = Harness::new(|config, _, _| {
        user_routes(config);
        config.map_unknown_routes("not-found");
    });

    assert_completed(&harness.load("/nope/here"));

    let current = harness.app.current_instruction().unwrap();
    assert_eq!(current.config.route(), "/nope/here");
    assert_eq!(current.params.get("path"), Some("/nope/here"));
    assert_eq!(harness.loader.loads(), vec!["not-found"]);
}

#[test]
fn test_unknown_route_strategy_without_answer_is_invalid() {
    let harness = Harness::new(|config, _, _| {
        user_routes(config);
        config.map_unknown_routes(UnknownRouteHandler::strategy(|_: &NavigationInstruction| {
            HookResult::stream(futures::stream::empty())
        }));
    });

    let error = pollster::block_on(harness.app.load_url("/nope")).unwrap_err();
    assert_eq!(error, RouterError::InvalidUnknownRouteHandler);
}

#[test]
fn test_navigation_strategy_picks_module_per_navigation() {
    let harness = Harness::new(|config, _, _| {
        config.map(
            RouteConfig::new("kinds/:kind").navigation_strategy(|instruction: &NavigationInstruction| {
                let kind = instruction.params.get("kind").unwrap_or("none").to_string();
                HookResult::value(RouteConfig::new("").module_id(format!("kinds/{kind}")))
            }),
        );
    });

    assert_completed(&harness.load("/kinds/admin"));

    let current = harness.app.current_instruction().unwrap();
    assert_eq!(current.config.route(), "kinds/:kind");
    assert_eq!(harness.loader.loads(), vec!["kinds/admin"]);
}

#[test]
fn test_failed_first_navigation_uses_fallback_route() {
    let harness = Harness::new(|config, loader, _| {
        config
            .map(RouteConfig::new("home").module_id("home"))
            .map(RouteConfig::new("guarded").module_id("guarded"))
            .fallback_route("home");
        loader.module("guarded", || {
            ViewModel::new("guarded").can_activate(|_: &LifecycleArgs| HookResult::from(false))
        });
    });

    let result = harness.load("/guarded");

    assert_canceled(&result);
    assert_eq!(harness.current_fragment().as_deref(), Some("/home"));
    assert_eq!(
        harness.events.entries(),
        vec![
            "router:navigation:processing",
            "router:navigation:child:complete",
            "router:navigation:canceled",
            "router:navigation:complete",
        ]
    );
}

#[test]
fn test_missing_view_port_rejects_commit() {
    let harness = Harness::new(|config, _, _| {
        config.map(
            RouteConfig::new("split")
                .view_port("left", ViewPortConfig::module("left"))
                .view_port("right", ViewPortConfig::module("right")),
        );
    });
    harness
        .app
        .register_view_port("left", RecordingViewPort::new(harness.log.clone()));

    let result = harness.load("/split");

    assert_eq!(result.status, PipelineStatus::Rejected);
    assert!(matches!(
        result.output.as_error(),
        Some(RouterError::MissingViewPort { name, .. }) if name == "right"
    ));
    assert!(harness.app.current_instruction().is_none());
}

#[test]
fn test_sibling_view_ports_swap_after_all_processed() {
    let harness = Harness::new(|config, _, _| {
        config.map(
            RouteConfig::new("split")
                .view_port("left", ViewPortConfig::module("left"))
                .view_port("right", ViewPortConfig::module("right")),
        );
    });
    for name in ["left", "right"] {
        harness
            .app
            .register_view_port(name, RecordingViewPort::new(harness.log.clone()));
    }

    assert_completed(&harness.load("/split"));

    let entries = harness.log.entries();
    let last_process = entries.iter().rposition(|e| e.starts_with("process:"));
    let first_swap = entries.iter().position(|e| e.starts_with("swap:"));
    assert_eq!(entries.len(), 4);
    assert!(last_process < first_swap);
}

// ============================================================================
// Navigation API
// ============================================================================

#[test]
fn test_navigate_records_history_and_navigate_back() {
    let harness = Harness::new(|config, _, _| user_routes(config));

    let options = NavigationOptions::new();
    let first = pollster::block_on(harness.app.navigate("users/1", options)).unwrap();
    assert_completed(&first.unwrap());
    let second = pollster::block_on(harness.app.navigate("/users/2", options)).unwrap();
    assert_completed(&second.unwrap());
    assert_eq!(harness.history.entries(), vec!["/", "/users/1", "/users/2"]);

    let back = pollster::block_on(harness.app.navigate_back()).unwrap();

    assert_completed(&back.unwrap());
    assert_eq!(harness.current_fragment().as_deref(), Some("/users/1"));
}

#[test]
fn test_navigate_without_trigger_only_updates_history() {
    let harness = Harness::new(|config, _, _| user_routes(config));

    let result = pollster::block_on(
        harness
            .app
            .navigate("users/3", NavigationOptions::new().trigger(false)),
    )
    .unwrap();

    assert!(result.is_none());
    assert_eq!(harness.history.fragment(), "/users/3");
    assert!(harness.app.current_instruction().is_none());
}

#[test]
fn test_navigate_to_route_generates_url() {
    let harness = Harness::new(|config, _, _| user_routes(config));

    let params = RouteParams::from_pairs([("id", "9")]);
    let result = pollster::block_on(harness.app.navigate_to_route(
        "user",
        &params,
        NavigationOptions::new(),
    ))
    .unwrap();

    assert_completed(&result.unwrap());
    assert_eq!(harness.current_fragment().as_deref(), Some("/users/9"));
}

#[test]
fn test_title_uses_nav_model_and_router_title() {
    let harness = Harness::new(|config, _, _| {
        config
            .map(
                RouteConfig::new("users/:id")
                    .module_id("users/detail")
                    .title("User"),
            )
            .title("App")
            .options(RouterOptions::new().transform_title(|title| title.to_uppercase()));
    });

    harness.load("/users/1");

    assert_eq!(harness.history.title().as_deref(), Some("USER | APP"));
}

#[tokio::test]
async fn test_navigation_on_tokio_runtime() {
    let harness = Harness::new(|config, _, _| user_routes(config));

    let result = harness.app.load_url("/users/11").await.unwrap();

    assert_completed(&result);
    assert_eq!(harness.current_fragment().as_deref(), Some("/users/11"));
}
