macro_rules! card_columns {
    () => {
        "card.id, card.name, card.types, card.costs, card.number_cost, card.id_external, \
         card.order_external, card.id_rarity, card.id_set, card.id_asset, card.rules, card.rate, \
         card.rate_votes, card.artist, card.flavor, card.data, card.created_at, card.updated_at, \
         card.deleted_at"
    };
}

macro_rules! set_columns {
    () => {
        "expansion.id, expansion.name, expansion.alias, expansion.assets, expansion.created_at, \
         expansion.updated_at, expansion.deleted_at"
    };
}

pub const CARD_COLUMNS: &str = card_columns!();

pub const SET_COLUMNS: &str = set_columns!();

pub const CARD_ORDER: &str =
    "(select s.name from expansion s where s.id = card.id_set), card.order_external, card.name";

pub const SET_ORDER: &str = "expansion.name";

pub const CARD_FROM_ID: &str = concat!(
    "select ",
    card_columns!(),
    r"
from card
where card.id = $1
  and card.deleted_at is null"
);

pub const SET_FROM_ID: &str = concat!(
    "select ",
    set_columns!(),
    r"
from expansion
where expansion.id = $1
  and expansion.deleted_at is null"
);

pub const RARITY_FROM_ID: &str = r"
select rarity.id, rarity.name, rarity.alias, rarity.created_at, rarity.updated_at, rarity.deleted_at
from rarity
where rarity.id = $1
  and rarity.deleted_at is null
";

pub const LIVE_SET_IDS: &str = r"
select expansion.id
from expansion
where expansion.id = any($1)
  and expansion.deleted_at is null
";

pub const LIVE_RARITY_IDS: &str = r"
select rarity.id
from rarity
where rarity.id = any($1)
  and rarity.deleted_at is null
";

pub const UPSERT_SET: &str = concat!(
    r"
insert into expansion (id, name, alias, assets, created_at, updated_at, deleted_at)
values ($1, $2, $3, $4, $5, $5, null)
on conflict (id) do update
    set name       = excluded.name,
        alias      = excluded.alias,
        assets     = excluded.assets,
        updated_at = excluded.updated_at,
        deleted_at = null
returning ",
    set_columns!()
);

pub const UPSERT_RARITY: &str = r"
insert into rarity (id, name, alias, created_at, updated_at, deleted_at)
values ($1, $2, $3, $4, $4, null)
on conflict (id) do update
    set name       = excluded.name,
        alias      = excluded.alias,
        updated_at = excluded.updated_at,
        deleted_at = null
returning rarity.id, rarity.name, rarity.alias, rarity.created_at, rarity.updated_at, rarity.deleted_at
";

pub const UPSERT_CARD: &str = r"
insert into card (id, name, types, costs, number_cost, id_external, order_external, id_rarity,
                  id_set, id_asset, rules, rate, rate_votes, artist, flavor, data,
                  created_at, updated_at, deleted_at)
values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $17, null)
on conflict (id) do update
    set name           = excluded.name,
        types          = excluded.types,
        costs          = excluded.costs,
        number_cost    = excluded.number_cost,
        id_external    = excluded.id_external,
        order_external = excluded.order_external,
        id_rarity      = excluded.id_rarity,
        id_set         = excluded.id_set,
        id_asset       = excluded.id_asset,
        rules          = excluded.rules,
        rate           = excluded.rate,
        rate_votes     = excluded.rate_votes,
        artist         = excluded.artist,
        flavor         = excluded.flavor,
        data           = excluded.data,
        updated_at     = excluded.updated_at,
        deleted_at     = null
";

pub const SOFT_DELETE_CARD: &str = r"
update card
set deleted_at = $2,
    updated_at = $2
where card.id = $1
  and card.deleted_at is null
";
