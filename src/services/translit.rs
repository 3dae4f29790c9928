//! Macedonian Cyrillic to Latin transliteration for issuer display names.

/// Official or customary English names that a plain character mapping would
/// get wrong. Checked before falling back to per-character transliteration.
const NAME_OVERRIDES: &[(&str, &str)] = &[
    ("Комерцијална банка АД Скопје", "Komercijalna Banka AD Skopje"),
    ("Алкалоид АД Скопје", "Alkaloid AD Skopje"),
    ("Гранит АД Скопје", "Granit AD Skopje"),
    ("Макпетрол АД Скопје", "Makpetrol AD Skopje"),
    ("Македонски Телеком АД", "Makedonski Telekom AD"),
    ("НЛБ Банка АД Скопје", "NLB Banka AD Skopje"),
    ("Стопанска банка АД Скопје", "Stopanska Banka AD Skopje"),
    ("ТТК Банка АД Скопје", "TTK Banka AD Skopje"),
    ("Уни Банка АД Скопје", "Uni Banka AD Skopje"),
    ("Охридска банка АД Скопје", "Ohridska Banka AD Skopje"),
    ("Реплек АД Скопје", "Replek AD Skopje"),
    ("Прилепска Пиварница АД Прилеп", "Prilepska Pivarnica AD Prilep"),
    ("Витаминка АД Прилеп", "Vitaminka AD Prilep"),
    ("Фершпед АД Скопје", "Fersped AD Skopje"),
    ("Тутунски Комбинат АД Прилеп", "Tutunski Kombinat AD Prilep"),
    ("Макошпед АД Скопје", "Makosped AD Skopje"),
    ("Окта АД Скопје", "Okta AD Skopje"),
    ("Либерти АД Скопје", "Liberty AD Skopje"),
    ("РЖ Услуги АД Скопје", "RZ Uslugi AD Skopje"),
    ("РЖ Институт АД Скопје", "RZ Institut AD Skopje"),
    ("РЖ Техничка контрола АД Скопје", "RZ Tehnichka Kontrola AD Skopje"),
    ("Цементарница УСЈЕ АД Скопје", "Cementarnica USJE AD Skopje"),
    ("ФЗЦ 11 Октомври АД Куманово", "FZC 11 Oktomvri AD Kumanovo"),
    ("Факом АД Скопје", "Fakot AD Skopje"),
    ("Бим АД Свети Николе", "BIM AD Sveti Nikole"),
    ("АрцелорМиттал (ХРМ) АД Скопје", "ArcelorMittal (HRM) AD Skopje"),
    ("Дебарски Бањи - Цапа АД Дебар", "Debarski Banji - Capa AD Debar"),
    ("Интерпромет АД Тетово", "Interpromet AD Tetovo"),
    ("Жито Лукс АД Скопје", "Zito Luks AD Skopje"),
    ("Могила промет АД", "Mogila Promet AD"),
    ("Макстил АД Скопје", "Makstil AD Skopje"),
    ("Стопанска банка АД Битола", "Stopanska Banka AD Bitola"),
];

/// Transliterate a Macedonian Cyrillic name to Latin script. Characters
/// outside the Macedonian alphabet (Latin letters, digits, punctuation)
/// pass through unchanged.
pub fn transliterate(text: &str) -> String {
    if let Some((_, latin)) = NAME_OVERRIDES.iter().find(|(cyrillic, _)| *cyrillic == text) {
        return (*latin).to_string();
    }

    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match latin_for(ch) {
            Some(mapped) => out.push_str(mapped),
            None => out.push(ch),
        }
    }
    out
}

fn latin_for(ch: char) -> Option<&'static str> {
    let mapped = match ch {
        'А' => "A",
        'Б' => "B",
        'В' => "V",
        'Г' => "G",
        'Д' => "D",
        'Ѓ' => "Gj",
        'Е' => "E",
        'Ж' => "Zh",
        'З' => "Z",
        'Ѕ' => "Dz",
        'И' => "I",
        'Ј' => "J",
        'К' => "K",
        'Л' => "L",
        'Љ' => "Lj",
        'М' => "M",
        'Н' => "N",
        'Њ' => "Nj",
        'О' => "O",
        'П' => "P",
        'Р' => "R",
        'С' => "S",
        'Т' => "T",
        'Ќ' => "Kj",
        'У' => "U",
        'Ф' => "F",
        'Х' => "H",
        'Ц' => "C",
        'Ч' => "Ch",
        'Џ' => "Dzh",
        'Ш' => "Sh",
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'ѓ' => "gj",
        'е' => "e",
        'ж' => "zh",
        'з' => "z",
        'ѕ' => "dz",
        'и' => "i",
        'ј' => "j",
        'к' => "k",
        'л' => "l",
        'љ' => "lj",
        'м' => "m",
        'н' => "n",
        'њ' => "nj",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'ќ' => "kj",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "c",
        'ч' => "ch",
        'џ' => "dzh",
        'ш' => "sh",
        _ => return None,
    };
    Some(mapped)
}
