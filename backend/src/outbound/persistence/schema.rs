//! Diesel table definitions; keep in step with `backend/migrations`.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        /// Lower-cased; unique.
        email -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Items owned by a user, detected in a room photo or added by hand.
    inventory_items (id) {
        id -> Uuid,
        owner_id -> Uuid,
        name -> Varchar,
        category -> Varchar,
        description -> Nullable<Text>,
        image_path -> Nullable<Text>,
        confidence -> Nullable<Float8>,
        /// `[x1, y1, x2, y2]` in image pixels.
        bbox -> Nullable<Array<Float8>>,
        /// `manual` or `ai_scan`.
        detection_method -> Varchar,
        /// Lifecycle status; see `InventoryStatus`.
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Items offered for sale.
    marketplace_listings (id) {
        id -> Uuid,
        seller_id -> Uuid,
        name -> Varchar,
        price -> Float8,
        category -> Varchar,
        location -> Varchar,
        image -> Text,
        /// `available` or `sold`.
        status -> Varchar,
        listed_at -> Timestamptz,
        /// Source item; cleared when the item is deleted.
        inventory_item_id -> Nullable<Uuid>,
    }
}

diesel::joinable!(inventory_items -> users (owner_id));
diesel::joinable!(marketplace_listings -> users (seller_id));
diesel::joinable!(marketplace_listings -> inventory_items (inventory_item_id));

diesel::allow_tables_to_appear_in_same_query!(users, inventory_items, marketplace_listings);
