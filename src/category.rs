//! This file defines the `Category` type, the types needed to create a
//! category and the API routes for the category type.
//! A category classifies expense transactions and is the subject of monthly
//! budgets; income transactions are not categorised.

use std::{
    fmt::Display,
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    alert::Alert,
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE,
        FORM_SELECT_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
    },
    navigation::NavBar,
};

/// Whether a category applies to income or expense transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum CategoryKind {
    /// The category classifies income (pemasukan) transactions.
    Income,
    /// The category classifies expense (pengeluaran) transactions.
    Expense,
}

impl CategoryKind {
    /// The string stored in the database for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryKind::Income => "pemasukan",
            CategoryKind::Expense => "pengeluaran",
        }
    }

    /// The label shown in the UI for this kind.
    pub fn label(self) -> &'static str {
        match self {
            CategoryKind::Income => "Pemasukan",
            CategoryKind::Expense => "Pengeluaran",
        }
    }
}

impl FromStr for CategoryKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pemasukan" => Ok(CategoryKind::Income),
            "pengeluaran" => Ok(CategoryKind::Expense),
            other => Err(Error::InvalidCategoryKind(other.to_owned())),
        }
    }
}

impl Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The name of a category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryName] if `name` is an empty string.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The ID of a category.
pub type CategoryId = i64;

/// A classification for transactions, e.g., 'Makanan', 'Transportasi', 'Gaji'.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,

    /// The name of the category.
    pub name: CategoryName,

    /// Whether this category applies to income or expenses.
    pub kind: CategoryKind,
}

// ============================================================================
// VIEWS
// ============================================================================

fn category_form_view(error_message: &str) -> Markup {
    let create_category_endpoint = endpoints::CATEGORIES_API;

    html! {
        form
            hx-post=(create_category_endpoint)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Nama Kategori" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Makanan, Transportasi, dll"
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="kind" class=(FORM_LABEL_STYLE) { "Jenis" }

                select id="kind" name="kind" class=(FORM_SELECT_STYLE)
                {
                    option value=(CategoryKind::Expense.as_str()) { (CategoryKind::Expense.label()) }
                    option value=(CategoryKind::Income.as_str()) { (CategoryKind::Income.label()) }
                }
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Tambah Kategori" }
        }
    }
}

fn edit_category_form_view(update_endpoint: &str, category_name: &str, error_message: &str) -> Markup {
    html! {
        form
            hx-put=(update_endpoint)
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Nama Kategori" }

                input
                    id="name"
                    type="text"
                    name="name"
                    value=(category_name)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update Kategori" }
        }
    }
}

fn edit_category_view(category_id: CategoryId, category_name: &str, error_message: &str) -> Markup {
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();
    let update_endpoint = endpoints::format_endpoint(endpoints::CATEGORY, category_id);
    let form = edit_category_form_view(&update_endpoint, category_name, error_message);

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold my-4" { "Edit Kategori" }
            (form)
        }
    };

    base("Edit Kategori", &[], &content)
}

fn categories_table_view(title: &str, categories: &[&Category]) -> Markup {
    html! {
        h2 class="text-lg font-semibold mt-6 mb-2" { (title) }

        @if categories.is_empty() {
            p class="text-gray-500 dark:text-gray-400" { "Belum ada kategori" }
        } @else {
            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Nama" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "" }
                    }
                }

                tbody
                {
                    @for category in categories {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (category.name) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                a
                                    href=(endpoints::format_endpoint(endpoints::EDIT_CATEGORY_VIEW, category.id))
                                    class=(LINK_STYLE)
                                {
                                    "Edit"
                                }

                                " "

                                button
                                    hx-delete=(endpoints::format_endpoint(endpoints::CATEGORY, category.id))
                                    hx-target="closest tr"
                                    hx-swap="outerHTML"
                                    hx-confirm="Yakin ingin menghapus kategori ini?"
                                    class=(BUTTON_DELETE_STYLE)
                                {
                                    "Hapus"
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn categories_view(categories: &[Category], error_message: &str) -> Markup {
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();

    let expense_categories: Vec<_> = categories
        .iter()
        .filter(|category| category.kind == CategoryKind::Expense)
        .collect();
    let income_categories: Vec<_> = categories
        .iter()
        .filter(|category| category.kind == CategoryKind::Income)
        .collect();

    let content = html! {
        (nav_bar)

        div class="flex flex-col px-6 py-8 mx-auto max-w-screen-md text-gray-900 dark:text-white"
        {
            h1 class="text-xl font-bold mb-4" { "Kategori" }

            (categories_table_view("Pengeluaran", &expense_categories))
            (categories_table_view("Pemasukan", &income_categories))

            div class="mt-8 max-w-md"
            {
                h2 class="text-lg font-semibold mb-2" { "Tambah Kategori Baru" }
                (category_form_view(error_message))
            }
        }
    };

    base("Kategori", &[], &content)
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// The state needed for the category pages and endpoints.
#[derive(Debug, Clone)]
pub struct CategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating or renaming a category.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryFormData {
    /// The category name submitted by the user.
    pub name: String,
    /// The category kind, only present on the create form.
    #[serde(default)]
    pub kind: Option<String>,
}

/// Route handler for the category listing page.
pub async fn get_categories_page(State(state): State<CategoryState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_all_categories(&connection)?;

    Ok(categories_view(&categories, "").into_response())
}

/// A route handler for creating a new category.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    Form(form_data): Form<CategoryFormData>,
) -> Response {
    let name = match CategoryName::new(&form_data.name) {
        Ok(name) => name,
        Err(error) => {
            return category_form_view(&format!("Error: {error}")).into_response();
        }
    };

    let kind = match form_data.kind.as_deref().unwrap_or_default().parse() {
        Ok(kind) => kind,
        Err(error) => {
            return category_form_view(&format!("Error: {error}")).into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_category(name, kind, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a category: {error}");

            error.into_alert_response()
        }
    }
}

/// Route handler for the edit category page.
pub async fn get_edit_category_page(
    Path(category_id): Path<CategoryId>,
    State(state): State<CategoryState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    match get_category(category_id, &connection) {
        Ok(category) => {
            Ok(edit_category_view(category_id, category.name.as_ref(), "").into_response())
        }
        Err(error) => {
            let error_message = match error {
                Error::NotFound => "Kategori tidak ditemukan",
                _ => {
                    tracing::error!("Failed to retrieve category {category_id}: {error}");
                    "Failed to load category"
                }
            };

            Ok(edit_category_view(category_id, "", error_message).into_response())
        }
    }
}

/// A route handler for renaming a category.
pub async fn update_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<CategoryState>,
    Form(form_data): Form<CategoryFormData>,
) -> Response {
    let name = match CategoryName::new(&form_data.name) {
        Ok(name) => name,
        Err(error) => {
            return edit_category_view(category_id, &form_data.name, &format!("Error: {error}"))
                .into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_category(category_id, name, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::UpdateMissingCategory) => Error::UpdateMissingCategory.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating category {category_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

/// A route handler for deleting a category.
///
/// Transactions referencing the deleted category keep their rows; their
/// category reference is set to NULL and they fall into the "Lain-lain"
/// bucket in reports.
pub async fn delete_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<CategoryState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_category(category_id, &connection) {
        Ok(_) => Alert::SuccessSimple {
            message: "Kategori berhasil dihapus".to_owned(),
        }
        .into_response(),
        Err(Error::DeleteMissingCategory) => Error::DeleteMissingCategory.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting category {category_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a category in the database.
///
/// # Errors
/// This function will return an [Error::DuplicateCategoryName] if a category
/// with the same name and kind already exists, or an error if there is some
/// other SQL error.
pub fn create_category(
    name: CategoryName,
    kind: CategoryKind,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .execute(
            "INSERT INTO category (name, kind) VALUES (?1, ?2);",
            (name.as_ref(), kind.as_str()),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateCategoryName(name.to_string()),
            error => error.into(),
        })?;

    let id = connection.last_insert_rowid();

    Ok(Category { id, name, kind })
}

/// Retrieve the category with `category_id` from the database.
///
/// # Errors
/// This function will return an [Error::NotFound] if the category does not
/// exist, or an error if there is an SQL error.
pub fn get_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name, kind FROM category WHERE id = :id;")?
        .query_one(&[(":id", &category_id)], map_row)
        .map_err(|error| error.into())
}

/// Rename a category in the database.
///
/// # Errors
/// This function will return an error if there is an SQL error or if the category doesn't exist.
pub fn update_category(
    category_id: CategoryId,
    new_name: CategoryName,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE category SET name = ?1 WHERE id = ?2",
        (new_name.as_ref(), category_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCategory);
    }

    Ok(())
}

/// Delete a category from the database.
///
/// # Errors
/// This function will return an error if there is an SQL error or if the category doesn't exist.
pub fn delete_category(category_id: CategoryId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM category WHERE id = ?1", [category_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

/// Retrieve all categories in the database, ordered by name.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, kind FROM category ORDER BY name ASC;")?
        .query_map([], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the categories of one kind, ordered by name.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_categories_by_kind(
    kind: CategoryKind,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, kind FROM category WHERE kind = :kind ORDER BY name ASC;")?
        .query_map(&[(":kind", kind.as_str())], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Create the category table in the database.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            UNIQUE(name, kind)
        );

        CREATE INDEX IF NOT EXISTS idx_category_kind ON category(kind);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let raw_kind: String = row.get(2)?;

    let name = CategoryName::new_unchecked(&raw_name);
    let kind = raw_kind.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("invalid category kind {raw_kind}").into(),
        )
    })?;

    Ok(Category { id, name, kind })
}

// ============================================================================
// TESTS
// ============================================================================



#[cfg(test)]
mod categories_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use rusqlite::Connection;
    use scraper::{Html, Selector};

    use crate::{
        category::{CategoryKind, CategoryName, CategoryState, create_category},
        db::initialize,
    };

    use super::get_categories_page;

    #[tokio::test]
    async fn lists_categories_grouped_by_kind() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        create_category(
            CategoryName::new("Makanan").unwrap(),
            CategoryKind::Expense,
            &connection,
        )
        .unwrap();
        let state = CategoryState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_categories_page(State(state)).await.unwrap();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = Html::parse_document(&String::from_utf8_lossy(&body));
        let cell_selector = Selector::parse("td").unwrap();
        let cells: Vec<_> = html
            .select(&cell_selector)
            .map(|cell| cell.text().collect::<String>())
            .collect();

        assert!(cells.iter().any(|text| text.contains("Makanan")));
    }
}
