//! User-facing texts. Everything the bot says is built here so flows and jobs
//! only decide *what* to say.

use crate::core::constants::{INSTALLMENT_NO, INSTALLMENT_YES};
use crate::core::models::message::{OutgoingMessage, ReplyOption};
use crate::core::models::summary::{Categories, MonthlySummary};
use crate::core::models::transaction::{Transaction, TransactionKind, TransactionStatus};
use crate::core::notifications::{DailyDigest, DueStatus, WeeklyStats};
use crate::core::parsing::{format_date, format_money};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::cmp::Ordering;

pub fn welcome(first_name: Option<&str>) -> String {
    format!(
        "🏦 *Bem-vindo ao Bot de Controle Financeiro!*\n\n\
         Olá {}! Eu sou seu assistente pessoal para controle financeiro.\n\n\
         *Comandos disponíveis:*\n\
         • /receita - Registrar uma nova receita\n\
         • /despesa - Registrar uma nova despesa\n\
         • /listar - Ver suas transações\n\
         • /pagar - Marcar despesa como paga\n\
         • /categorias - Ver suas categorias\n\
         • /relatorio - Gerar relatório mensal\n\
         • /help - Ajuda e instruções\n\n\
         Para começar, use /receita para registrar uma receita ou /despesa para registrar uma despesa.",
        first_name.unwrap_or("")
    )
}

pub fn help() -> String {
    "🆘 *Ajuda - Bot de Controle Financeiro*\n\n\
     📈 */receita* - Registra uma nova receita\n\
     💸 */despesa* - Registra uma nova despesa (suporta parcelamento)\n\
     📋 */listar* - Lista suas últimas transações\n\
     💰 */pagar <ID>* - Marca despesa como paga\n\
     🏷️ */categorias* - Mostra suas categorias\n\
     📊 */relatorio* - Relatório do mês atual\n\
     ❌ */cancel* - Cancela a operação em andamento\n\n\
     Datas: use DD/MM/AAAA ou digite 'hoje'.\n\
     Valores: 150.50 ou 150,50."
        .to_string()
}

pub fn no_active_flow() -> String {
    "🤔 Não entendi. Use /receita, /despesa ou /help para ver os comandos disponíveis.".to_string()
}

pub fn cancelled() -> String {
    "❌ Operação cancelada. Use /help para ver os comandos disponíveis.".to_string()
}

pub fn generic_error() -> String {
    "❌ Ocorreu um erro inesperado. Tente novamente mais tarde.".to_string()
}

fn kind_label(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Income => "receita",
        TransactionKind::Expense => "despesa",
    }
}

fn kind_emoji(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Income => "📈",
        TransactionKind::Expense => "💸",
    }
}

// Entry flow

pub fn ask_category(kind: TransactionKind) -> String {
    match kind {
        TransactionKind::Income => "💰 *Registrar Nova Receita*\n\n\
             Qual a categoria desta receita?\n\
             Exemplos: Salário, Freelance, Vendas, Investimentos"
            .to_string(),
        TransactionKind::Expense => "💸 *Registrar Nova Despesa*\n\n\
             Qual a categoria desta despesa?\n\
             Exemplos: Alimentação, Transporte, Aluguel, Lazer"
            .to_string(),
    }
}

pub fn ask_description(kind: TransactionKind, category: &str) -> String {
    format!(
        "Categoria: *{}*\n\nAgora, digite uma descrição para esta {}:",
        category,
        kind_label(kind)
    )
}

pub fn ask_amount(kind: TransactionKind, description: &str) -> String {
    format!(
        "Descrição: *{}*\n\nQual o valor desta {}? (apenas números)",
        description,
        kind_label(kind)
    )
}

pub fn invalid_amount() -> String {
    "❌ Valor inválido! Digite apenas números.\nExemplo: 150.50 ou 150,50".to_string()
}

pub fn ask_date(kind: TransactionKind, amount: Decimal) -> String {
    let question = match kind {
        TransactionKind::Income => "Qual a data de recebimento?",
        TransactionKind::Expense => "Qual a data de vencimento?",
    };
    format!(
        "Valor: *{}*\n\n{} (DD/MM/AAAA)\nOu digite 'hoje' para a data atual:",
        format_money(amount),
        question
    )
}

pub fn invalid_date() -> String {
    "❌ Data inválida! Use o formato DD/MM/AAAA\nExemplo: 25/12/2024 ou digite 'hoje'".to_string()
}

pub fn ask_installment_choice(due_date: NaiveDate) -> OutgoingMessage {
    OutgoingMessage::with_options(
        format!(
            "Vencimento: *{}*\n\nEsta despesa é parcelada?",
            format_date(due_date)
        ),
        installment_options(),
    )
}

pub fn pick_installment_option() -> OutgoingMessage {
    OutgoingMessage::with_options(
        "👆 Escolha uma das opções: esta despesa é parcelada?",
        installment_options(),
    )
}

fn installment_options() -> Vec<ReplyOption> {
    vec![
        ReplyOption::new("Sim", INSTALLMENT_YES),
        ReplyOption::new("Não", INSTALLMENT_NO),
    ]
}

pub fn ask_installment_count() -> String {
    "💳 *Despesa Parcelada*\n\nQuantas parcelas? (número inteiro)".to_string()
}

pub fn invalid_installment_count() -> String {
    "❌ Número de parcelas inválido! Digite um número inteiro positivo.\nExemplo: 12".to_string()
}

pub fn ask_installment_amount(count: u32) -> String {
    format!(
        "Parcelas: *{}x*\n\nQual o valor de cada parcela? (apenas números)",
        count
    )
}

pub fn entry_confirmation(tx: &Transaction) -> String {
    let (title, date_label) = match tx.kind {
        TransactionKind::Income => ("✅ *Receita registrada com sucesso!*", "📅 Data"),
        TransactionKind::Expense => ("✅ *Despesa registrada com sucesso!*", "📅 Vencimento"),
    };
    let mut message = format!(
        "{}\n\n{} Categoria: {}\n📝 Descrição: {}\n💰 Valor: {}\n{}: {}\n",
        title,
        kind_emoji(tx.kind),
        tx.category,
        tx.description,
        format_money(tx.amount),
        date_label,
        format_date(tx.due_date)
    );
    if let Some(installment) = &tx.installment {
        message.push_str(&format!(
            "💳 Parcelado: {}x de {}\n",
            installment.total_installments,
            format_money(installment.installment_amount)
        ));
    }
    message.push_str(&format!("🆔 ID: `{}`", tx.id));
    message
}

pub fn entry_failure(kind: TransactionKind) -> String {
    format!("❌ Erro ao registrar {}. Tente novamente.", kind_label(kind))
}

// Payment flow

pub fn payment_usage() -> String {
    "💰 Para marcar uma despesa como paga, use:\n/pagar <ID_da_despesa>\n\n\
     Use /listar para ver os IDs das suas despesas."
        .to_string()
}

pub fn payment_not_found() -> String {
    "❌ Transação não encontrada ou não pertence a você.\nVerifique o ID e tente novamente.".to_string()
}

pub fn payment_not_expense() -> String {
    "❌ Esta transação não é uma despesa.\nApenas despesas podem ser marcadas como pagas.".to_string()
}

pub fn payment_already_paid() -> String {
    "✅ Esta despesa já está marcada como paga!".to_string()
}

pub fn ask_payment_date(tx: &Transaction) -> String {
    format!(
        "💰 *Marcar como Pago*\n\n💸 {}\n📝 {}\n💰 {}\n\n\
         Qual a data do pagamento? (DD/MM/AAAA)\nOu digite 'hoje' para a data atual:",
        tx.category,
        tx.description,
        format_money(tx.amount)
    )
}

pub fn payment_confirmation(tx: &Transaction, paid_on: NaiveDate) -> String {
    format!(
        "✅ *Despesa marcada como paga!*\n\n💸 {}\n📝 {}\n💰 {}\n📅 Pago em: {}",
        tx.category,
        tx.description,
        format_money(tx.amount),
        format_date(paid_on)
    )
}

pub fn payment_failure() -> String {
    "❌ Erro ao marcar despesa como paga. Tente novamente.".to_string()
}

// Queries

pub fn transaction_list(transactions: &[Transaction]) -> String {
    if transactions.is_empty() {
        return "📋 Você ainda não possui transações registradas.\nUse /receita ou /despesa para começar!"
            .to_string();
    }
    let mut message = String::from("📋 *Suas Últimas Transações:*\n\n");
    for tx in transactions {
        let status = match tx.status {
            TransactionStatus::Paid => "✅",
            TransactionStatus::Open => "⏳",
        };
        message.push_str(&format!(
            "{} *{}* {}\n📝 {}\n💰 {}\n🆔 `{}`\n📅 Venc: {}\n\n",
            kind_emoji(tx.kind),
            tx.category,
            status,
            tx.description,
            format_money(tx.amount),
            tx.id,
            format_date(tx.due_date)
        ));
    }
    message
}

pub fn categories(categories: &Categories) -> String {
    if categories.is_empty() {
        return "🏷️ Você ainda não possui categorias.\nRegistre algumas transações primeiro!".to_string();
    }
    let mut message = String::from("🏷️ *Suas Categorias:*\n\n");
    if !categories.income.is_empty() {
        message.push_str("📈 *Receitas:*\n");
        for category in &categories.income {
            message.push_str(&format!("• {}\n", category));
        }
        message.push('\n');
    }
    if !categories.expense.is_empty() {
        message.push_str("💸 *Despesas:*\n");
        for category in &categories.expense {
            message.push_str(&format!("• {}\n", category));
        }
    }
    message
}

fn verdict(net: Decimal, period: &str) -> String {
    match net.cmp(&Decimal::ZERO) {
        Ordering::Greater => format!("✅ Parabéns! Saldo positivo {}!", period),
        Ordering::Less => "⚠️ Atenção! Suas despesas superaram as receitas.".to_string(),
        Ordering::Equal => "⚖️ Suas receitas e despesas estão equilibradas.".to_string(),
    }
}

pub fn monthly_report(summary: &MonthlySummary, year: i32, month: u32) -> String {
    let period = NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%B/%Y").to_string())
        .unwrap_or_else(|| format!("{:02}/{}", month, year));
    format!(
        "📊 *Relatório - {}*\n\n📈 Receitas: {}\n💸 Despesas: {}\n💰 Saldo: {}\n\
         📋 Total de transações: {}\n\n{}",
        period,
        format_money(summary.income_total),
        format_money(summary.expense_total),
        format_money(summary.net),
        summary.count,
        verdict(summary.net, "este mês")
    )
}

// Notifications

pub fn due_notification(tx: &Transaction, status: DueStatus) -> String {
    let (emoji, urgency, label) = match status {
        DueStatus::Overdue { days } => ("🚨", "URGENTE", format!("VENCIDA há {} dia(s)", days)),
        DueStatus::DueToday => ("⚠️", "ATENÇÃO", "VENCE HOJE".to_string()),
        DueStatus::DueTomorrow => ("📅", "LEMBRETE", "vence AMANHÃ".to_string()),
        DueStatus::Upcoming { days } => ("📋", "LEMBRETE", format!("vence em {} dias", days)),
    };
    let mut message = format!(
        "{} *{} - Despesa {}*\n\n💸 *{}*\n📝 {}\n💰 Valor: {}\n📅 Vencimento: {}\n🆔 ID: `{}`\n\n",
        emoji,
        urgency,
        label,
        tx.category,
        tx.description,
        format_money(tx.amount),
        format_date(tx.due_date),
        tx.id
    );
    if let Some(installment) = &tx.installment {
        message.push_str(&format!(
            "💳 Parcela {}/{} ({})\n\n",
            installment.current_installment,
            installment.total_installments,
            format_money(installment.installment_amount)
        ));
    }
    if matches!(status, DueStatus::Overdue { .. }) {
        message.push_str("⚡ *Ação necessária:* Marque como paga usando /pagar ou atualize o vencimento.");
    } else {
        message.push_str("💡 *Dica:* Use /pagar para marcar como paga quando efetuar o pagamento.");
    }
    message
}

pub fn daily_summary(digest: &DailyDigest, today: NaiveDate) -> String {
    let mut message = format!(
        "🌅 *Resumo Diário - {}*\n\n📊 *Transações Abertas:*\n\
         📈 Receitas: {} ({})\n💸 Despesas: {} ({})\n\n",
        format_date(today),
        digest.open_income_count,
        format_money(digest.open_income_total),
        digest.open_expense_count,
        format_money(digest.open_expense_total)
    );
    if digest.due_today_count > 0 {
        message.push_str(&format!("⚠️ *{} despesa(s) vencem hoje:*\n", digest.due_today_count));
        for (category, amount) in &digest.due_today {
            message.push_str(&format!("• {}: {}\n", category, format_money(*amount)));
        }
        if digest.due_today_overflow > 0 {
            message.push_str(&format!("• ... e mais {}\n", digest.due_today_overflow));
        }
        message.push('\n');
    }
    message.push_str(
        "💡 *Dicas:*\n• Use /listar para ver todas as transações\n\
         • Use /pagar para marcar despesas como pagas\n\
         • Use /relatorio para ver o resumo mensal",
    );
    message
}

pub fn weekly_report(stats: &WeeklyStats, week_start: NaiveDate, today: NaiveDate) -> String {
    let mut message = format!(
        "📊 *Relatório Semanal*\n📅 {} - {}\n\n📈 Receitas: {} ({})\n💸 Despesas: {} ({})\n\
         💰 Saldo: {}\n📋 Total: {} transações\n\n",
        week_start.format("%d/%m"),
        format_date(today),
        format_money(stats.income_total),
        stats.income_count,
        format_money(stats.expense_total),
        stats.expense_count,
        format_money(stats.net),
        stats.income_count + stats.expense_count
    );
    if let Some((category, uses)) = &stats.top_category {
        message.push_str(&format!("🏆 Categoria mais usada: *{}* ({}x)\n\n", category, uses));
    }
    message.push_str(&verdict(stats.net, "na semana"));
    message
}
