//! Positional ordering across products and categories: dense ranks,
//! neighbour swaps, explicit placement and gap closing.

mod common;

use common::{category, product, setup};
use tienda_server::db::models::Product;
use tienda_server::services::Direction;
use tienda_server::utils::AppError;

fn id_of(product: &Product) -> String {
    product.id.as_ref().expect("persisted product has an id").to_string()
}

async fn seed_three(state: &tienda_server::AppState) -> Vec<Product> {
    state.catalog.create_category(category("chocolates")).await.unwrap();
    for (nombre, referencia) in [
        ("Tableta 70%", "CHO-1"),
        ("Bombones surtidos", "CHO-2"),
        ("Chocolate con leche", "CHO-3"),
    ] {
        state
            .catalog
            .create_product(product(nombre, referencia, "chocolates"))
            .await
            .unwrap();
    }
    state.catalog.products_by_category("chocolates").await.unwrap()
}

#[tokio::test]
async fn new_products_rank_densely_from_one() {
    let (state, _notifier, _dir) = setup().await;
    let products = seed_three(&state).await;

    let ranks: Vec<i64> = products.iter().map(|p| p.orden_categoria).collect();
    assert_eq!(ranks, vec![1, 2, 3]);
    assert_eq!(products[0].referencia, "CHO-1");
}

#[tokio::test]
async fn ranks_are_scoped_per_category() {
    let (state, _notifier, _dir) = setup().await;
    state.catalog.create_category(category("chocolates")).await.unwrap();
    state.catalog.create_category(category("turrones")).await.unwrap();

    state
        .catalog
        .create_product(product("Tableta", "CHO-1", "chocolates"))
        .await
        .unwrap();
    let turron = state
        .catalog
        .create_product(product("Turrón blando", "TUR-1", "turrones"))
        .await
        .unwrap();

    // Each category starts its own sequence at 1
    assert_eq!(turron.orden_categoria, 1);
}

#[tokio::test]
async fn deleting_a_product_closes_the_gap() {
    let (state, _notifier, _dir) = setup().await;
    let products = seed_three(&state).await;

    state.catalog.delete_product(&id_of(&products[1])).await.unwrap();

    let remaining = state.catalog.products_by_category("chocolates").await.unwrap();
    let ranks: Vec<i64> = remaining.iter().map(|p| p.orden_categoria).collect();
    assert_eq!(ranks, vec![1, 2]);
    // Relative order of the survivors is preserved
    assert_eq!(remaining[0].referencia, "CHO-1");
    assert_eq!(remaining[1].referencia, "CHO-3");
}

#[tokio::test]
async fn storage_rejects_a_second_holder_of_the_same_rank() {
    let (state, _notifier, _dir) = setup().await;
    state.catalog.create_category(category("chocolates")).await.unwrap();
    state
        .catalog
        .create_product(product("Tableta", "CHO-1", "chocolates"))
        .await
        .unwrap();

    // Explicit rank 1 is already taken; the unique rank index refuses it
    let mut colliding = product("Bombones", "CHO-2", "chocolates");
    colliding.orden_categoria = Some(1);
    let result = state.catalog.create_product(colliding).await;
    assert!(matches!(result, Err(AppError::Conflict(_))), "{result:?}");

    // The same explicit rank is fine in another category
    state.catalog.create_category(category("turrones")).await.unwrap();
    let mut elsewhere = product("Turrón", "TUR-1", "turrones");
    elsewhere.orden_categoria = Some(1);
    let created = state.catalog.create_product(elsewhere).await.unwrap();
    assert_eq!(created.orden_categoria, 1);
}

#[tokio::test]
async fn gap_close_shifts_several_ranks_in_order() {
    let (state, _notifier, _dir) = setup().await;
    state.catalog.create_category(category("chocolates")).await.unwrap();
    let mut products = Vec::new();
    for i in 1..=4 {
        products.push(
            state
                .catalog
                .create_product(product(&format!("Producto {i}"), &format!("CHO-{i}"), "chocolates"))
                .await
                .unwrap(),
        );
    }

    // Deleting the first product shifts every survivor down by one
    state
        .catalog
        .delete_product(&products[0].id.as_ref().unwrap().to_string())
        .await
        .unwrap();

    let remaining = state.catalog.products_by_category("chocolates").await.unwrap();
    let ranks: Vec<i64> = remaining.iter().map(|p| p.orden_categoria).collect();
    assert_eq!(ranks, vec![1, 2, 3]);
    let referencias: Vec<&str> = remaining.iter().map(|p| p.referencia.as_str()).collect();
    assert_eq!(referencias, vec!["CHO-2", "CHO-3", "CHO-4"]);
}

#[tokio::test]
async fn move_step_swaps_with_the_neighbour() {
    let (state, _notifier, _dir) = setup().await;
    let products = seed_three(&state).await;

    state
        .catalog
        .move_product(&id_of(&products[2]), Direction::Up)
        .await
        .unwrap();

    let reordered = state.catalog.products_by_category("chocolates").await.unwrap();
    let referencias: Vec<&str> = reordered.iter().map(|p| p.referencia.as_str()).collect();
    assert_eq!(referencias, vec!["CHO-1", "CHO-3", "CHO-2"]);
    let ranks: Vec<i64> = reordered.iter().map(|p| p.orden_categoria).collect();
    assert_eq!(ranks, vec![1, 2, 3]);
}

#[tokio::test]
async fn step_past_the_edge_is_a_boundary_error() {
    let (state, _notifier, _dir) = setup().await;
    let products = seed_three(&state).await;

    let first = state
        .catalog
        .move_product(&id_of(&products[0]), Direction::Up)
        .await;
    assert!(matches!(first, Err(AppError::Boundary(_))), "{first:?}");

    let last = state
        .catalog
        .move_product(&id_of(&products[2]), Direction::Down)
        .await;
    assert!(matches!(last, Err(AppError::Boundary(_))), "{last:?}");

    // Nothing moved
    let unchanged = state.catalog.products_by_category("chocolates").await.unwrap();
    let ranks: Vec<i64> = unchanged.iter().map(|p| p.orden_categoria).collect();
    assert_eq!(ranks, vec![1, 2, 3]);
}

#[tokio::test]
async fn explicit_position_exchanges_with_the_occupant() {
    let (state, _notifier, _dir) = setup().await;
    let products = seed_three(&state).await;

    state
        .catalog
        .set_product_position(&id_of(&products[0]), 3)
        .await
        .unwrap();

    let reordered = state.catalog.products_by_category("chocolates").await.unwrap();
    let referencias: Vec<&str> = reordered.iter().map(|p| p.referencia.as_str()).collect();
    assert_eq!(referencias, vec!["CHO-3", "CHO-2", "CHO-1"]);
}

#[tokio::test]
async fn explicit_vacant_position_is_taken_directly() {
    let (state, _notifier, _dir) = setup().await;
    let products = seed_three(&state).await;

    state
        .catalog
        .set_product_position(&id_of(&products[0]), 7)
        .await
        .unwrap();

    let reordered = state.catalog.products_by_category("chocolates").await.unwrap();
    let moved = reordered.iter().find(|p| p.referencia == "CHO-1").unwrap();
    assert_eq!(moved.orden_categoria, 7);
    // Nobody else moved
    assert_eq!(reordered.iter().find(|p| p.referencia == "CHO-2").unwrap().orden_categoria, 2);
}

#[tokio::test]
async fn position_below_one_is_rejected() {
    let (state, _notifier, _dir) = setup().await;
    let products = seed_three(&state).await;

    let result = state.catalog.set_product_position(&id_of(&products[0]), 0).await;
    assert!(matches!(result, Err(AppError::Validation(_))), "{result:?}");
}

#[tokio::test]
async fn changing_category_appends_and_closes_the_old_gap() {
    let (state, _notifier, _dir) = setup().await;
    let products = seed_three(&state).await;
    state.catalog.create_category(category("turrones")).await.unwrap();
    state
        .catalog
        .create_product(product("Turrón duro", "TUR-1", "turrones"))
        .await
        .unwrap();

    state
        .catalog
        .change_product_category(&id_of(&products[0]), "turrones")
        .await
        .unwrap();

    let turrones = state.catalog.products_by_category("turrones").await.unwrap();
    let moved = turrones.iter().find(|p| p.referencia == "CHO-1").unwrap();
    assert_eq!(moved.orden_categoria, 2);
    assert_eq!(moved.categoria, "turrones");

    let chocolates = state.catalog.products_by_category("chocolates").await.unwrap();
    let ranks: Vec<i64> = chocolates.iter().map(|p| p.orden_categoria).collect();
    assert_eq!(ranks, vec![1, 2]);
}

#[tokio::test]
async fn categories_rank_and_move_like_products() {
    let (state, _notifier, _dir) = setup().await;
    let chocolates = state.catalog.create_category(category("chocolates")).await.unwrap();
    let turrones = state.catalog.create_category(category("turrones")).await.unwrap();
    assert_eq!(chocolates.orden, 1);
    assert_eq!(turrones.orden, 2);

    let id = chocolates.id.as_ref().unwrap().to_string();
    state
        .catalog
        .move_category(&id, Direction::Down)
        .await
        .unwrap();

    let ordered = state.catalog.all_categories().await.unwrap();
    let nombres: Vec<&str> = ordered.iter().map(|c| c.nombre.as_str()).collect();
    assert_eq!(nombres, vec!["turrones", "chocolates"]);
}

#[tokio::test]
async fn occupied_explicit_category_rank_is_rejected() {
    let (state, _notifier, _dir) = setup().await;
    state.catalog.create_category(category("chocolates")).await.unwrap();

    let mut taken = category("turrones");
    taken.orden = Some(1);
    let result = state.catalog.create_category(taken).await;
    assert!(matches!(result, Err(AppError::Conflict(_))), "{result:?}");
}

#[tokio::test]
async fn deleting_a_category_closes_the_catalog_gap() {
    let (state, _notifier, _dir) = setup().await;
    let a = state.catalog.create_category(category("chocolates")).await.unwrap();
    state.catalog.create_category(category("turrones")).await.unwrap();
    state.catalog.create_category(category("mazapanes")).await.unwrap();

    state
        .catalog
        .delete_category(&a.id.as_ref().unwrap().to_string())
        .await
        .unwrap();

    let remaining = state.catalog.all_categories().await.unwrap();
    let ranks: Vec<i64> = remaining.iter().map(|c| c.orden).collect();
    assert_eq!(ranks, vec![1, 2]);
    assert_eq!(remaining[0].nombre, "turrones");
}
