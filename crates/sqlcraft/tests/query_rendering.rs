//! End-to-end rendering tests across the builder surface.

use sqlcraft::expr::func;
use sqlcraft::{
    declare, delete, if_then, insert, multi, select, select_from, set_var, update, Case,
    CompileOptions, Expr, Frame, IntoExpr, Statement, WindowSpec,
};

fn plain(statement: &impl Statement) -> String {
    statement.build(CompileOptions::empty()).unwrap()
}

#[test]
fn select_end_to_end() {
    let query = select()
        .column(("a", "Id"))
        .column(("a", "Name"))
        .from(("Accounts", "a"))
        .where_(|c| c.column(("a", "Age")).greater_than(18))
        .order_by(("a", "Name"));
    assert_eq!(
        plain(&query),
        "SELECT a.Id, a.Name FROM Accounts a WHERE a.Age > 18 ORDER BY a.Name"
    );
}

#[test]
fn clause_keywords_keep_grammar_order_regardless_of_call_order() {
    // Calls arrive in scrambled order; the output order is fixed.
    let query = select()
        .order_by("Region")
        .having(|c| c.expression(func::count_all()).greater_than(10))
        .group_by("Region")
        .where_(|c| c.column("Age").greater_than(18))
        .from("Accounts")
        .column("Region");
    assert_eq!(
        plain(&query),
        "SELECT Region FROM Accounts WHERE Age > 18 \
         GROUP BY Region HAVING COUNT(*) > 10 ORDER BY Region"
    );
}

#[test]
fn explicit_order_tags_control_position_internal_ordering() {
    use sqlcraft::builder::SelectPosition;
    let query = select()
        .from("T")
        .expression(Expr::raw("c3"), SelectPosition::Column, 3)
        .expression(Expr::raw("c1"), SelectPosition::Column, 1)
        .expression(Expr::raw("c2"), SelectPosition::Column, 2);
    assert_eq!(plain(&query), "SELECT c1, c2, c3 FROM T");
}

#[test]
fn build_does_not_mutate_the_builder() {
    let query = select_from("T").where_(|c| c.column("a").equal_to(1));
    let first = plain(&query);
    let second = plain(&query);
    let third = query.build(CompileOptions::FORMAT).unwrap();
    assert_eq!(first, second);
    assert_eq!(third, "SELECT *\nFROM T\nWHERE a = 1");
    assert_eq!(plain(&query), first);
}

#[test]
fn cloned_builders_diverge_independently() {
    let base = select_from("Accounts").where_(|c| c.column("Active").equal_to(true));
    let adults = base.clone().where_(|c| c.column("Age").greater_or_equal(18));
    let named = base.clone().where_(|c| c.column("Name").is_not_null());
    assert_eq!(
        plain(&base),
        "SELECT * FROM Accounts WHERE Active = TRUE"
    );
    assert_eq!(
        plain(&adults),
        "SELECT * FROM Accounts WHERE Active = TRUE AND Age >= 18"
    );
    assert_eq!(
        plain(&named),
        "SELECT * FROM Accounts WHERE Active = TRUE AND Name IS NOT NULL"
    );
}

#[test]
fn groups_parenthesize_structurally_not_by_precedence() {
    let query = select_from("T").where_(|c| {
        c.group(|c| c.column("a").equal_to(1).or().column("b").equal_to(2))
            .and()
            .column("c")
            .equal_to(3)
    });
    assert_eq!(
        plain(&query),
        "SELECT * FROM T WHERE (a = 1 OR b = 2) AND c = 3"
    );
}

#[test]
fn window_function_with_two_sided_frame() {
    let query = select()
        .column("Region")
        .column_expr(
            func::sum(Expr::column("Amount").unwrap())
                .over(
                    WindowSpec::new()
                        .partition_by("Region")
                        .order_by("Day")
                        .frame(Frame::rows().between().preceding(6).and().current_row()),
                )
                .into_expr()
                .with_alias("WeeklyTotal")
                .unwrap(),
        )
        .from("Sales");
    assert_eq!(
        plain(&query),
        "SELECT Region, SUM(Amount) OVER (PARTITION BY Region ORDER BY Day \
         ROWS BETWEEN 6 PRECEDING AND CURRENT ROW) AS WeeklyTotal FROM Sales"
    );
}

#[test]
fn case_expression_in_column_list() {
    let bucket = Case::searched()
        .when(|c| c.column("Age").greater_or_equal(18))
        .then("adult")
        .otherwise("minor")
        .end()
        .unwrap();
    let query = select()
        .column("Name")
        .column_expr(bucket.into_expr().with_alias("Bucket").unwrap())
        .from("Accounts");
    assert_eq!(
        plain(&query),
        "SELECT Name, CASE WHEN Age >= 18 THEN 'adult' ELSE 'minor' END AS Bucket \
         FROM Accounts"
    );
}

#[test]
fn nested_subquery_keeps_terminator_at_the_outermost_level_only() {
    let inner = select_from("Orders").where_(|c| c.column("Total").greater_than(100));
    let query = select_from("Accounts")
        .where_(|c| c.column("Id").in_query(inner));
    assert_eq!(
        query.build(CompileOptions::APPEND_SEPARATOR).unwrap(),
        "SELECT * FROM Accounts WHERE Id IN (SELECT * FROM Orders WHERE Total > 100);"
    );
}

#[test]
fn union_chain_renders_before_order_by() {
    let query = select_from("Current")
        .union(select_from("Archive2024"))
        .union_all(select_from("Archive2023"))
        .order_by("Id");
    assert_eq!(
        plain(&query),
        "SELECT * FROM Current UNION SELECT * FROM Archive2024 \
         UNION ALL SELECT * FROM Archive2023 ORDER BY Id"
    );
}

#[test]
fn alias_registry_is_stable_across_references() {
    struct Account;
    impl sqlcraft::Dataset for Account {}

    let query = select()
        .typed_column::<Account>("Id")
        .typed_column::<Account>("Name")
        .from_table::<Account>();
    assert_eq!(
        plain(&query),
        "SELECT Account.Id, Account.Name FROM Account Account"
    );

    let query = select()
        .alias_for::<Account>("a")
        .typed_column::<Account>("Id")
        .from_table::<Account>();
    assert_eq!(plain(&query), "SELECT a.Id FROM Account a");
}

#[test]
fn invalid_argument_fails_build_but_spares_valid_state() {
    let good = select_from("T").column("Id");
    let bad = good.clone().column("   ");
    let err = bad.build(CompileOptions::empty()).unwrap_err();
    assert!(err.is_invalid_argument());
    // The original is untouched and the valid part still renders.
    assert_eq!(plain(&good), "SELECT Id FROM T");
}

#[test]
fn first_recorded_error_wins() {
    let query = select_from("T").column(" ").group_by("");
    let err = query.build(CompileOptions::empty()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid argument `column`: cannot be empty or whitespace"
    );
}

#[test]
fn insert_update_delete_round_out_the_crud_surface() {
    let ins = insert("Accounts")
        .columns(&["Name", "Age"])
        .values(["Ada".into_expr(), 36.into_expr()]);
    assert_eq!(
        plain(&ins),
        "INSERT INTO Accounts (Name, Age) VALUES ('Ada', 36)"
    );

    let upd = update("Accounts")
        .set("Age", 37)
        .where_(|c| c.column("Name").equal_to("Ada"));
    assert_eq!(plain(&upd), "UPDATE Accounts SET Age = 37 WHERE Name = 'Ada'");

    let del = delete("Accounts").where_(|c| c.column("Age").less_than(0));
    assert_eq!(plain(&del), "DELETE FROM Accounts WHERE Age < 0");
}

#[test]
fn script_with_variables_and_branches() {
    let script = multi()
        .statement(declare("Threshold", "INT").default_value(10))
        .statement(set_var("Threshold", Expr::raw("@Threshold * 2")))
        .statement(
            if_then(|c| {
                c.expression(Expr::variable("Threshold").unwrap()).greater_than(15)
            })
            .then(update("T").set("Flagged", true))
            .otherwise()
            .then(update("T").set("Flagged", false)),
        );
    assert_eq!(
        plain(&script),
        "DECLARE @Threshold INT = 10; SET @Threshold = @Threshold * 2; \
         IF @Threshold > 15 THEN UPDATE T SET Flagged = TRUE; \
         ELSE UPDATE T SET Flagged = FALSE; END IF;"
    );
}

#[test]
fn formatted_output_splits_clauses_across_lines() {
    let query = select()
        .column("Id")
        .from("Accounts")
        .where_(|c| c.column("Age").greater_than(18))
        .order_by("Id");
    assert_eq!(
        query
            .build(CompileOptions::FORMAT | CompileOptions::APPEND_SEPARATOR)
            .unwrap(),
        "SELECT Id\nFROM Accounts\nWHERE Age > 18\nORDER BY Id;"
    );
}
