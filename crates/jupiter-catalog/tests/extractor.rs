//! Curriculum extraction over captured page fixtures.

use jupiter_catalog::extractor::duration::{from_text, DurationKind};
use jupiter_catalog::extract_course;

const DURATION_TEXT: &str = "Unidade: Instituto de Matemática e Estatística Curso: Bacharelado em \
     Ciência da Computação Duração Ideal: 8 semestres Duração Mínima: 6 semestres \
     Duração Máxima: 12 semestres Período: Integral";

fn page(body: &str) -> String {
    format!("<html><head><title>Júpiter</title></head><body>{body}</body></html>")
}

#[test]
fn test_durations_from_flattened_text() {
    let html = page(&format!("<div id=\"step4\"><p>{DURATION_TEXT}</p></div>"));
    let course = extract_course(&html, "Bacharelado em Ciência da Computação", "IME");

    assert_eq!(course.duration_ideal.as_deref(), Some("8 semestres"));
    assert_eq!(course.duration_min.as_deref(), Some("6 semestres"));
    assert_eq!(course.duration_max.as_deref(), Some("12 semestres"));
}

#[test]
fn test_duration_micro_parser_matches_page_extraction() {
    for (kind, expected) in [
        (DurationKind::Ideal, "8 semestres"),
        (DurationKind::Minimum, "6 semestres"),
        (DurationKind::Maximum, "12 semestres"),
    ] {
        assert_eq!(from_text(DURATION_TEXT, kind).unwrap(), expected);
    }
}

#[test]
fn test_mandatory_table_rejects_empty_name_row() {
    let html = page(
        "<table>
           <tr><td>Disciplinas Obrigatórias</td></tr>
           <tr><td>Créditos Aula Créditos Trabalho Horas</td></tr>
           <tr><td>MAT101</td><td>Calculus</td><td>4</td><td>0</td><td>60</td></tr>
           <tr><td>MAT102</td><td></td><td>2</td><td>0</td><td>30</td></tr>
         </table>",
    );
    let course = extract_course(&html, "Bacharelado em Matemática", "IME");

    assert_eq!(course.mandatory.len(), 1);
    let d = &course.mandatory[0];
    assert_eq!(d.code, "MAT101");
    assert_eq!(d.name, "Calculus");
    assert_eq!((d.class_credits, d.work_credits, d.hours), (4, 0, 60));
    assert!(course.elective.is_empty());
    assert!(course.free_elective.is_empty());
}

#[test]
fn test_three_categories_and_unrelated_tables() {
    let html = page(
        "<table><caption>Dados do Curso</caption>
           <tr><td>Duração Ideal</td><td>10 semestres</td></tr>
           <tr><td>Duração Mínima</td><td>8 semestres</td></tr>
           <tr><td>Duração Máxima</td><td>15 semestres</td></tr>
         </table>
         <table>
           <tr><td>Disciplinas Obrigatórias</td></tr>
           <tr><th>Código</th><th>Nome</th><th>Créditos Aula</th></tr>
           <tr><td>4302111</td><td>Física I</td><td>6</td><td>0</td><td>90</td></tr>
           <tr><td>MAT2453</td><td>Cálculo Diferencial e Integral I</td><td>6</td><td>0</td><td>90</td><td>0</td><td>0</td><td>15</td></tr>
         </table>
         <table>
           <tr><td>Disciplinas Optativas Eletivas</td></tr>
           <tr><td>4300356</td><td>Elementos de Astronomia</td><td>4</td></tr>
           <tr><td>Total de créditos</td><td>4</td></tr>
         </table>
         <table>
           <tr><td>Disciplinas Optativas Livres</td></tr>
           <tr><td>Créditos Aula</td><td>Créditos Trabalho</td></tr>
           <tr><td>FLF0115</td><td>Introdução à Filosofia</td><td>4</td><td>1</td><td>60</td></tr>
         </table>
         <table>
           <tr><td>Observações</td></tr>
           <tr><td>XYZ</td><td>Ignorada</td></tr>
           <tr><td>XYZ</td><td>Ignorada</td></tr>
         </table>",
    );
    let course = extract_course(&html, "Bacharelado em Física", "IF");

    assert_eq!(course.name, "Bacharelado em Física");
    assert_eq!(course.unit, "IF");
    assert_eq!(course.duration_ideal.as_deref(), Some("10 semestres"));
    assert_eq!(course.duration_max.as_deref(), Some("15 semestres"));

    let codes = |list: &[jupiter_catalog::Discipline]| -> Vec<String> {
        list.iter().map(|d| d.code.clone()).collect()
    };
    assert_eq!(codes(&course.mandatory), vec!["4302111", "MAT2453"]);
    assert_eq!(course.mandatory[1].atpa_hours, 15);
    assert_eq!(codes(&course.elective), vec!["4300356"]);
    assert_eq!(codes(&course.free_elective), vec!["FLF0115"]);
    assert_eq!(course.free_elective[0].work_credits, 1);
    assert_eq!(course.discipline_count(), 4);
}

#[test]
fn test_page_without_curriculum_still_yields_course() {
    let course = extract_course(&page("<p>Sessão expirada</p>"), "Licenciatura em Química", "IQ");
    assert_eq!(course.name, "Licenciatura em Química");
    assert_eq!(course.duration_ideal, None);
    assert_eq!(course.discipline_count(), 0);
}

#[test]
fn test_info_table_wrapped_in_layout_markup() {
    let html = page(
        "<table width=\"100%\"><tr><td>
           <table><caption>Dados do Curso</caption>
             <tr><td>Duração Ideal</td><td>8 semestres</td></tr>
             <tr><td>Duração Mínima</td><td>6 semestres</td></tr>
             <tr><td>Duração Máxima</td><td>12 semestres</td></tr>
           </table>
         </td></tr>
         <tr><td>
           <table>
             <tr><td>Disciplinas Obrigatórias</td></tr>
             <tr><td>MAC0110</td><td>Introdução à Computação</td><td>4</td><td>0</td><td>60</td></tr>
             <tr><td>MAC0121</td><td>Algoritmos e Estruturas de Dados I</td><td>4</td><td>0</td><td>60</td></tr>
           </table>
         </td></tr></table>",
    );
    let course = extract_course(&html, "Bacharelado em Ciência da Computação", "IME");

    assert_eq!(course.duration_ideal.as_deref(), Some("8 semestres"));
    assert_eq!(course.duration_min.as_deref(), Some("6 semestres"));
    assert_eq!(course.duration_max.as_deref(), Some("12 semestres"));
    assert_eq!(course.mandatory.len(), 2);
}

#[test]
fn test_info_table_label_in_two_rows_uses_last() {
    let html = page(
        "<table><caption>Dados do Curso</caption>
           <tr><td>Duração Máxima (currículo anterior)</td><td>14 semestres</td></tr>
           <tr><td>Duração Máxima</td><td>12 semestres</td></tr>
         </table>",
    );
    let course = extract_course(&html, "Licenciatura em Física", "IF");

    assert_eq!(course.duration_max.as_deref(), Some("12 semestres"));
    assert_eq!(course.duration_ideal, None);
}
